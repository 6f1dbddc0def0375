/// 24-bit ICAO aircraft address. Used as the flight identifier that
/// correlates every report belonging to one physical flight.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
pub struct ICAOAddress(u32);

impl ICAOAddress {
    pub const MAX_VALUE: u32 = 0x00FF_FFFF;

    pub fn new(value: u32) -> Result<Self, ICAOAddressError> {
        if value <= Self::MAX_VALUE {
            Ok(ICAOAddress(value))
        } else {
            Err(ICAOAddressError::InvalidAddress(value))
        }
    }

    pub fn from_hex_str(s: &str) -> Result<Self, ICAOAddressError> {
        if s.is_empty() || s.len() > 6 {
            return Err(ICAOAddressError::InvalidHexFormat(s.to_string()));
        }
        let value = u32::from_str_radix(s, 16)
            .map_err(|_| ICAOAddressError::InvalidHexFormat(s.to_string()))?;
        ICAOAddress::new(value)
    }

    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ICAOAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06X}", self.0)
    }
}

#[derive(Debug, PartialEq)]
pub enum ICAOAddressError {
    InvalidHexFormat(String),
    InvalidAddress(u32),
}
impl std::fmt::Display for ICAOAddressError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ICAOAddressError::InvalidHexFormat(string) => {
                write!(f, "Invalid hexadecimal address '{string}'")
            }
            ICAOAddressError::InvalidAddress(val) => {
                write!(
                    f,
                    "Value 0x{:X} ({}) exceeds 24-bit ICAO address limit (0x{:X})",
                    val,
                    val,
                    ICAOAddress::MAX_VALUE
                )
            }
        }
    }
}
impl std::error::Error for ICAOAddressError {}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Position {
            latitude,
            longitude,
        }
    }
}

/// Destination coordinates as handed back by a resolver backend. Only ever
/// used as a grouping key, so the text is kept exactly as scraped.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Location(String);

impl Location {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Location(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
