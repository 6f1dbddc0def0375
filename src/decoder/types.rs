use crate::types::{ICAOAddress, ICAOAddressError, Position};

/// One decoded basestation line. Optional fields are `None` when the
/// corresponding column was empty.
#[derive(Debug, PartialEq, Clone)]
pub struct RawReport {
    pub kind: MessageKind,
    pub flight: ICAOAddress,
    pub callsign: Option<String>,
    pub altitude: Option<i32>,
    pub position: Option<Position>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MessageKind {
    Transmission(TransmissionType),
    SelectionChange,
    NewId,
    NewAircraft,
    StatusChange,
    Click,
}

impl MessageKind {
    pub fn from_fields(kind: &str, transmission: Option<&str>) -> Result<Self, DecodeError> {
        match kind {
            "MSG" => {
                let raw = transmission.unwrap_or_default();
                let value: u8 = raw.parse().map_err(|_| DecodeError::InvalidField {
                    field: "transmission_type",
                    value: raw.to_string(),
                })?;
                Ok(MessageKind::Transmission(TransmissionType::from_u8(value)?))
            }
            "SEL" => Ok(MessageKind::SelectionChange),
            "ID" => Ok(MessageKind::NewId),
            "AIR" => Ok(MessageKind::NewAircraft),
            "STA" => Ok(MessageKind::StatusChange),
            "CLK" => Ok(MessageKind::Click),
            other => Err(DecodeError::UnknownKind(other.to_string())),
        }
    }

    /// Header-only kinds that may still carry a callsign.
    #[must_use]
    pub fn carries_callsign(&self) -> bool {
        matches!(
            self,
            MessageKind::Transmission(_) | MessageKind::SelectionChange | MessageKind::NewId
        )
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TransmissionType {
    Identification = 1,
    SurfacePosition = 2,
    AirbornePosition = 3,
    AirborneVelocity = 4,
    SurveillanceAltitude = 5,
    SurveillanceId = 6,
    AirToAir = 7,
    AllCallReply = 8,
}

impl TransmissionType {
    pub fn from_u8(value: u8) -> Result<Self, DecodeError> {
        match value {
            1 => Ok(TransmissionType::Identification),
            2 => Ok(TransmissionType::SurfacePosition),
            3 => Ok(TransmissionType::AirbornePosition),
            4 => Ok(TransmissionType::AirborneVelocity),
            5 => Ok(TransmissionType::SurveillanceAltitude),
            6 => Ok(TransmissionType::SurveillanceId),
            7 => Ok(TransmissionType::AirToAir),
            8 => Ok(TransmissionType::AllCallReply),
            other => Err(DecodeError::InvalidField {
                field: "transmission_type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum DecodeError {
    Empty,
    UnknownKind(String),
    FieldCount { kind: String, found: usize },
    MissingFlightIdentifier,
    InvalidFlightIdentifier(ICAOAddressError),
    InvalidField { field: &'static str, value: String },
    IncompletePosition,
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Empty => write!(f, "Empty message"),
            DecodeError::UnknownKind(kind) => write!(f, "Unknown message kind '{kind}'"),
            DecodeError::FieldCount { kind, found } => {
                write!(f, "Unexpected field count {found} for '{kind}' message")
            }
            DecodeError::MissingFlightIdentifier => write!(f, "Message has no hex ident"),
            DecodeError::InvalidFlightIdentifier(e) => write!(f, "{e}"),
            DecodeError::InvalidField { field, value } => {
                write!(f, "{field} component has invalid value '{value}'")
            }
            DecodeError::IncompletePosition => {
                write!(f, "Message carries only one of latitude and longitude")
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::InvalidFlightIdentifier(e) => Some(e),
            _ => None,
        }
    }
}
