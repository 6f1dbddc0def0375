use crate::types::Position;

/// Rectangular observation region. Edges count as inside.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Geofence {
    min_latitude: f64,
    max_latitude: f64,
    min_longitude: f64,
    max_longitude: f64,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Containment {
    Inside,
    Outside,
    /// The report carried no position.
    NotEvaluable,
}

impl Geofence {
    pub fn new(
        min_latitude: f64,
        max_latitude: f64,
        min_longitude: f64,
        max_longitude: f64,
    ) -> Result<Self, GeofenceError> {
        for (name, value) in [
            ("min_latitude", min_latitude),
            ("max_latitude", max_latitude),
            ("min_longitude", min_longitude),
            ("max_longitude", max_longitude),
        ] {
            if !value.is_finite() {
                return Err(GeofenceError::NonFinite(name));
            }
        }
        if !(-90.0..=90.0).contains(&min_latitude) || !(-90.0..=90.0).contains(&max_latitude) {
            return Err(GeofenceError::OutOfRange("latitude"));
        }
        if !(-180.0..=180.0).contains(&min_longitude) || !(-180.0..=180.0).contains(&max_longitude)
        {
            return Err(GeofenceError::OutOfRange("longitude"));
        }
        if min_latitude > max_latitude {
            return Err(GeofenceError::Inverted("latitude"));
        }
        if min_longitude > max_longitude {
            return Err(GeofenceError::Inverted("longitude"));
        }

        Ok(Geofence {
            min_latitude,
            max_latitude,
            min_longitude,
            max_longitude,
        })
    }

    #[must_use]
    pub fn evaluate(&self, position: Option<Position>) -> Containment {
        match position {
            None => Containment::NotEvaluable,
            Some(position) if self.contains(position) => Containment::Inside,
            Some(_) => Containment::Outside,
        }
    }

    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&position.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&position.longitude)
    }
}

impl std::fmt::Display for Geofence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{} -> {},{}",
            self.min_latitude, self.min_longitude, self.max_latitude, self.max_longitude
        )
    }
}

#[derive(Debug, PartialEq)]
pub enum GeofenceError {
    NonFinite(&'static str),
    OutOfRange(&'static str),
    Inverted(&'static str),
}
impl std::fmt::Display for GeofenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeofenceError::NonFinite(name) => write!(f, "Geofence bound {name} is not finite"),
            GeofenceError::OutOfRange(axis) => {
                write!(f, "Geofence {axis} bounds are outside the valid range")
            }
            GeofenceError::Inverted(axis) => {
                write!(f, "Geofence minimum {axis} is greater than maximum {axis}")
            }
        }
    }
}
impl std::error::Error for GeofenceError {}
