pub mod fallback;
pub mod flightaware;
pub mod holiday_extras;
pub mod worker;

pub use fallback::FallbackResolver;
pub use flightaware::FlightAwareResolver;
pub use holiday_extras::HolidayExtrasResolver;
pub use worker::ResolverWorker;

use crate::config::{ResolverBackend, ResolverConfig};
use crate::types::{ICAOAddress, Location};

/// Looks up where a flight is heading from its callsign. Implementations may
/// be slow and may fail, but must not have side effects visible to callers.
pub trait DestinationResolver: Send + Sync {
    fn resolve(&self, callsign: &str) -> Result<Location, ResolutionError>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionRequest {
    pub flight: ICAOAddress,
    pub callsign: String,
}

#[derive(Debug)]
pub struct ResolutionOutcome {
    pub flight: ICAOAddress,
    pub callsign: String,
    pub result: Result<Location, ResolutionError>,
}

impl ResolutionOutcome {
    #[must_use]
    pub fn resolve_with(resolver: &dyn DestinationResolver, request: ResolutionRequest) -> Self {
        let result = resolver.resolve(&request.callsign);
        ResolutionOutcome {
            flight: request.flight,
            callsign: request.callsign,
            result,
        }
    }
}

#[derive(Debug)]
pub enum ResolutionError {
    EmptyCallsign,
    Client(reqwest::Error),
    Request { url: String, source: reqwest::Error },
    Http { url: String, status: u16 },
    NotFound { backend: &'static str, callsign: String },
    NoBackends,
    Rejected(String),
    InvalidUrl(String),
}

impl std::fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionError::EmptyCallsign => {
                write!(f, "Not resolving a destination for an empty callsign")
            }
            ResolutionError::Client(e) => write!(f, "Failed to build HTTP client: {e}"),
            ResolutionError::Request { url, source } => {
                write!(f, "Failed to retrieve flight details from {url}: {source}")
            }
            ResolutionError::Http { url, status } => {
                write!(f, "Flight details request to {url} returned status {status}")
            }
            ResolutionError::NotFound { backend, callsign } => {
                write!(f, "{backend} has no destination for {callsign}")
            }
            ResolutionError::NoBackends => write!(f, "No resolver backends configured"),
            ResolutionError::Rejected(reason) => write!(f, "Resolution not attempted: {reason}"),
            ResolutionError::InvalidUrl(url) => write!(f, "Cannot build lookup URL from '{url}'"),
        }
    }
}

impl std::error::Error for ResolutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolutionError::Client(e) | ResolutionError::Request { source: e, .. } => Some(e),
            _ => None,
        }
    }
}

pub fn build_http_client(
    timeout: std::time::Duration,
) -> Result<reqwest::blocking::Client, ResolutionError> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("overflights/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ResolutionError::Client)
}

/// Appends `callsign` to `base` as one percent-encoded path segment.
pub(crate) fn flight_url(base: &str, callsign: &str) -> Result<reqwest::Url, ResolutionError> {
    let mut url =
        reqwest::Url::parse(base).map_err(|_| ResolutionError::InvalidUrl(base.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| ResolutionError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .push(callsign);
    Ok(url)
}

/// Fetches a page and hands its body to `extract`. Shared by the scraping
/// backends.
pub(crate) fn fetch_and_extract<F>(
    client: &reqwest::blocking::Client,
    url: &str,
    extract: F,
) -> Result<Location, ResolutionError>
where
    F: FnOnce(&str) -> Result<Location, ResolutionError>,
{
    let response = client
        .get(url)
        .send()
        .map_err(|source| ResolutionError::Request {
            url: url.to_string(),
            source,
        })?;

    if !response.status().is_success() {
        return Err(ResolutionError::Http {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let html = response.text().map_err(|source| ResolutionError::Request {
        url: url.to_string(),
        source,
    })?;
    extract(&html)
}

pub fn from_config(config: &ResolverConfig) -> Result<FallbackResolver, ResolutionError> {
    let client = build_http_client(std::time::Duration::from_secs(config.timeout_seconds))?;
    let backends: Vec<Box<dyn DestinationResolver>> = config
        .backends
        .iter()
        .map(|backend| -> Box<dyn DestinationResolver> {
            match backend {
                ResolverBackend::HolidayExtras => {
                    Box::new(HolidayExtrasResolver::new(client.clone()))
                }
                ResolverBackend::FlightAware => Box::new(FlightAwareResolver::new(client.clone())),
            }
        })
        .collect();
    if backends.is_empty() {
        return Err(ResolutionError::NoBackends);
    }
    Ok(FallbackResolver::new(backends))
}
