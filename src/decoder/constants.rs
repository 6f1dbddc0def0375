pub const FIELD_DELIMITER: char = ',';

pub const MSG_FIELD_COUNT: usize = 22;
pub const HEADER_FIELD_COUNT: usize = 10;

pub const KIND: usize = 0;
pub const TRANSMISSION_TYPE: usize = 1;
pub const HEX_IDENT: usize = 4;
pub const CALLSIGN: usize = 10;
pub const ALTITUDE: usize = 11;
pub const LATITUDE: usize = 14;
pub const LONGITUDE: usize = 15;
