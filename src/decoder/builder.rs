use super::constants::{
    ALTITUDE, CALLSIGN, FIELD_DELIMITER, HEADER_FIELD_COUNT, HEX_IDENT, KIND, LATITUDE, LONGITUDE,
    MSG_FIELD_COUNT, TRANSMISSION_TYPE,
};
use super::types::{DecodeError, MessageKind, RawReport};
use crate::types::{ICAOAddress, Position};

pub fn decode_report(line: &str) -> Result<RawReport, DecodeError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Err(DecodeError::Empty);
    }

    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    let kind_field = fields[KIND].trim();
    let kind = MessageKind::from_fields(kind_field, fields.get(TRANSMISSION_TYPE).copied())?;

    match kind {
        MessageKind::Transmission(_) if fields.len() != MSG_FIELD_COUNT => {
            return Err(DecodeError::FieldCount {
                kind: kind_field.to_string(),
                found: fields.len(),
            });
        }
        _ if fields.len() < HEADER_FIELD_COUNT => {
            return Err(DecodeError::FieldCount {
                kind: kind_field.to_string(),
                found: fields.len(),
            });
        }
        _ => {}
    }

    let hex_ident = fields[HEX_IDENT].trim();
    if hex_ident.is_empty() {
        return Err(DecodeError::MissingFlightIdentifier);
    }
    let flight =
        ICAOAddress::from_hex_str(hex_ident).map_err(DecodeError::InvalidFlightIdentifier)?;

    let callsign = if kind.carries_callsign() {
        fields
            .get(CALLSIGN)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    } else {
        None
    };

    let (altitude, position) = if let MessageKind::Transmission(_) = kind {
        let altitude = parse_field::<i32>(&fields, ALTITUDE, "altitude")?;
        let latitude = parse_field::<f64>(&fields, LATITUDE, "latitude")?;
        let longitude = parse_field::<f64>(&fields, LONGITUDE, "longitude")?;
        let position = match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Position::new(latitude, longitude)),
            (None, None) => None,
            _ => return Err(DecodeError::IncompletePosition),
        };
        (altitude, position)
    } else {
        (None, None)
    };

    Ok(RawReport {
        kind,
        flight,
        callsign,
        altitude,
        position,
    })
}

/// Empty columns are legitimately absent values, only a present but
/// unparsable value is an error.
pub fn parse_field<T>(
    fields: &[&str],
    index: usize,
    field_name: &'static str,
) -> Result<Option<T>, DecodeError>
where
    T: std::str::FromStr,
{
    let Some(raw) = fields.get(index).map(|value| value.trim()) else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| DecodeError::InvalidField {
            field: field_name,
            value: raw.to_string(),
        })
}
