use super::{fetch_and_extract, flight_url, DestinationResolver, ResolutionError};
use crate::types::Location;

const BASE_URL: &str = "http://www.holidayextras.co.uk/flight/";
const LAT_LONG: &str = "lat_long";

static ARRIVAL_LATLNG_REGEX: once_cell::sync::Lazy<regex::Regex> =
    once_cell::sync::Lazy::new(|| {
        let regex_string = format!(r"arrival_latlng = '(?P<{LAT_LONG}>[^']*)'");
        regex::Regex::new(&regex_string).unwrap()
    });

pub struct HolidayExtrasResolver {
    client: reqwest::blocking::Client,
}

impl HolidayExtrasResolver {
    #[must_use]
    pub fn new(client: reqwest::blocking::Client) -> Self {
        HolidayExtrasResolver { client }
    }

    pub fn extract_destination(html: &str, callsign: &str) -> Result<Location, ResolutionError> {
        ARRIVAL_LATLNG_REGEX
            .captures(html)
            .and_then(|captures| captures.name(LAT_LONG))
            .map(|lat_long| lat_long.as_str().trim())
            .filter(|lat_long| !lat_long.is_empty())
            .map(Location::new)
            .ok_or_else(|| ResolutionError::NotFound {
                backend: "holidayextras",
                callsign: callsign.to_string(),
            })
    }
}

impl DestinationResolver for HolidayExtrasResolver {
    fn resolve(&self, callsign: &str) -> Result<Location, ResolutionError> {
        if callsign.is_empty() {
            return Err(ResolutionError::EmptyCallsign);
        }
        let url = flight_url(BASE_URL, callsign)?;
        fetch_and_extract(&self.client, url.as_str(), |html| {
            Self::extract_destination(html, callsign)
        })
    }

    fn name(&self) -> &'static str {
        "holidayextras"
    }
}
