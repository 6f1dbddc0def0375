use super::{FlightRecord, FlightRecorder, PersistenceError};
use rusqlite::{params, Connection};
use std::path::Path;

pub struct SqliteRecorder {
    conn: Connection,
}

impl SqliteRecorder {
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(&db_path)?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, PersistenceError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, PersistenceError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS overflights (
                destination TEXT NOT NULL,
                recorded_at TEXT NOT NULL,
                callsign TEXT NOT NULL,
                altitude INTEGER NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_destination ON overflights(destination)",
            [],
        )?;
        log::info!("SQLite recorder initialised");
        Ok(SqliteRecorder { conn })
    }

    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn count(&self) -> Result<i64, PersistenceError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM overflights", [], |row| row.get(0))?)
    }
}

impl FlightRecorder for SqliteRecorder {
    fn append(&mut self, record: &FlightRecord) -> Result<(), PersistenceError> {
        self.conn.execute(
            "INSERT INTO overflights (destination, recorded_at, callsign, altitude)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.location.as_str(),
                record.recorded_at.to_rfc3339(),
                record.callsign,
                record.altitude,
            ],
        )?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "SQLite"
    }
}
