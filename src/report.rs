//! Offline heatmap of recorded destinations, grouped into altitude bands.
//! Reads the recorder's table only; never used by the live pipeline.

use rusqlite::{params, Connection};

pub const ALTITUDE_BAND_FEET: i32 = 9000;
pub const ALTITUDE_CEILING_FEET: i32 = 45000;

#[derive(Debug, PartialEq, Clone)]
pub struct HeatmapPoint {
    pub location: String,
    pub count: i64,
    /// Upper bound of the band, in feet.
    pub altitude_band: i32,
}

pub fn heatmap(conn: &Connection) -> Result<Vec<HeatmapPoint>, ReportError> {
    let mut statement = conn.prepare(
        "SELECT destination, COUNT(*) FROM overflights
         WHERE abs(altitude) > ?1 AND abs(altitude) <= ?2
         GROUP BY destination
         ORDER BY destination",
    )?;

    let mut points = Vec::new();
    let mut upper = ALTITUDE_BAND_FEET;
    while upper < ALTITUDE_CEILING_FEET {
        let lower = upper - ALTITUDE_BAND_FEET;
        let rows = statement.query_map(params![lower, upper], |row| {
            Ok(HeatmapPoint {
                location: row.get(0)?,
                count: row.get(1)?,
                altitude_band: upper,
            })
        })?;
        for point in rows {
            points.push(point?);
        }
        upper += ALTITUDE_BAND_FEET;
    }
    Ok(points)
}

/// Writes `[latitude, longitude, count, altitude_band]` rows as a JSON array.
/// Points whose location is not a `lat,lng` pair are left out.
pub fn write_heatmap(points: &[HeatmapPoint], path: &std::path::Path) -> Result<(), ReportError> {
    let rows: Vec<(f64, f64, i64, i32)> = points
        .iter()
        .filter_map(|point| match parse_coordinates(&point.location) {
            Some((latitude, longitude)) => {
                Some((latitude, longitude, point.count, point.altitude_band))
            }
            None => {
                log::warn!("Skipping heatmap location '{}'", point.location);
                None
            }
        })
        .collect();
    let file = std::fs::File::create(path).map_err(|source| ReportError::Io {
        source,
        path: path.to_path_buf(),
    })?;
    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer(&mut writer, &rows)?;
    std::io::Write::flush(&mut writer).map_err(|source| ReportError::Io {
        source,
        path: path.to_path_buf(),
    })?;
    log::info!("Wrote {} heatmap points to {}", rows.len(), path.display());
    Ok(())
}

fn parse_coordinates(location: &str) -> Option<(f64, f64)> {
    let (latitude, longitude) = location.split_once(',')?;
    let latitude: f64 = latitude.trim().parse().ok()?;
    let longitude: f64 = longitude.trim().parse().ok()?;
    (latitude.is_finite() && longitude.is_finite()).then_some((latitude, longitude))
}

#[derive(Debug)]
pub enum ReportError {
    Database(rusqlite::Error),
    Io {
        source: std::io::Error,
        path: std::path::PathBuf,
    },
    Serialization(serde_json::Error),
}

impl From<rusqlite::Error> for ReportError {
    fn from(err: rusqlite::Error) -> Self {
        ReportError::Database(err)
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::Serialization(err)
    }
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::Database(e) => write!(f, "Failed to query heatmap: {e}"),
            ReportError::Io { source, path } => {
                write!(f, "Failed to write heatmap '{}': {source}", path.display())
            }
            ReportError::Serialization(e) => write!(f, "Failed to serialise heatmap: {e}"),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::Database(e) => Some(e),
            ReportError::Io { source, .. } => Some(source),
            ReportError::Serialization(e) => Some(e),
        }
    }
}
