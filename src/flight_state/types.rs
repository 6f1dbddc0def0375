use crate::types::Location;

/// Overhead/recorded progress of a flight. Only moves forward, and a flight
/// can only be recorded once it has been overhead.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub enum FlightPhase {
    #[default]
    Approaching,
    Overhead,
    Recorded,
}

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub enum DestinationState {
    #[default]
    Unrequested,
    Pending,
    Resolved(Location),
    Failed,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct FlightAggregate {
    pub callsign: Option<String>,
    pub destination: DestinationState,
    pub altitude: Option<i32>,
    pub phase: FlightPhase,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FlightField {
    Callsign,
    Destination,
    Altitude,
    Phase,
}

#[derive(Debug, PartialEq, Clone)]
pub enum FlightFact {
    Callsign(String),
    Destination(DestinationState),
    Altitude(i32),
    Phase(FlightPhase),
}

/// Everything needed to write the durable record for a flight.
#[derive(Debug, PartialEq, Clone)]
pub struct CompletedFlight {
    pub callsign: String,
    pub destination: Location,
    pub altitude: i32,
}

impl FlightAggregate {
    #[must_use]
    pub fn has_been_overhead(&self) -> bool {
        self.phase >= FlightPhase::Overhead
    }

    #[must_use]
    pub fn is_recorded(&self) -> bool {
        self.phase == FlightPhase::Recorded
    }

    #[must_use]
    pub fn destination(&self) -> Option<&Location> {
        match &self.destination {
            DestinationState::Resolved(location) => Some(location),
            _ => None,
        }
    }

    /// Returns the record to persist once the flight has been overhead, has
    /// every fact and has not been recorded yet.
    #[must_use]
    pub fn completed(&self) -> Option<CompletedFlight> {
        if self.phase != FlightPhase::Overhead {
            return None;
        }
        Some(CompletedFlight {
            callsign: self.callsign.clone()?,
            destination: self.destination()?.clone(),
            altitude: self.altitude?,
        })
    }

    #[must_use]
    pub fn field(&self, field: FlightField) -> Option<FlightFact> {
        match field {
            FlightField::Callsign => self.callsign.clone().map(FlightFact::Callsign),
            FlightField::Destination => Some(FlightFact::Destination(self.destination.clone())),
            FlightField::Altitude => self.altitude.map(FlightFact::Altitude),
            FlightField::Phase => Some(FlightFact::Phase(self.phase)),
        }
    }

    pub fn apply(&mut self, fact: FlightFact) -> Result<(), StateError> {
        match fact {
            FlightFact::Callsign(callsign) => match &self.callsign {
                None => self.callsign = Some(callsign),
                Some(existing) if *existing != callsign => {
                    log::debug!("Keeping callsign {existing}, ignoring later {callsign}");
                }
                Some(_) => {}
            },
            FlightFact::Destination(destination) => {
                // a resolved destination is final
                if !matches!(self.destination, DestinationState::Resolved(_)) {
                    self.destination = destination;
                }
            }
            FlightFact::Altitude(altitude) => self.altitude = Some(altitude),
            FlightFact::Phase(phase) => {
                let illegal = phase < self.phase
                    || (phase == FlightPhase::Recorded && self.phase == FlightPhase::Approaching);
                if illegal {
                    return Err(StateError::IllegalTransition {
                        from: self.phase,
                        to: phase,
                    });
                }
                self.phase = phase;
            }
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
pub enum StateError {
    IllegalTransition { from: FlightPhase, to: FlightPhase },
}
impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateError::IllegalTransition { from, to } => {
                write!(f, "Illegal flight phase transition {from:?} -> {to:?}")
            }
        }
    }
}
impl std::error::Error for StateError {}
