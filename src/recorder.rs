pub mod sqlite;

pub use sqlite::SqliteRecorder;

use crate::types::Location;

/// A flight that passed overhead with everything known about it.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightRecord {
    pub location: Location,
    pub callsign: String,
    pub altitude: i32,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

/// Durable append-only sink for completed flights.
pub trait FlightRecorder: Send {
    fn append(&mut self, record: &FlightRecord) -> Result<(), PersistenceError>;

    fn backend_type(&self) -> &'static str;
}

#[derive(Debug)]
pub enum PersistenceError {
    Io(std::io::Error),
    Database(rusqlite::Error),
}

impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        PersistenceError::Io(err)
    }
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(err: rusqlite::Error) -> Self {
        PersistenceError::Database(err)
    }
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::Io(e) => write!(f, "IO error: {e}"),
            PersistenceError::Database(e) => write!(f, "Database error: {e}"),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistenceError::Io(e) => Some(e),
            PersistenceError::Database(e) => Some(e),
        }
    }
}
