use super::{DestinationResolver, ResolutionError};
use crate::types::Location;

/// Tries each backend in order and returns the first destination found.
pub struct FallbackResolver {
    backends: Vec<Box<dyn DestinationResolver>>,
}

impl FallbackResolver {
    #[must_use]
    pub fn new(backends: Vec<Box<dyn DestinationResolver>>) -> Self {
        FallbackResolver { backends }
    }

    #[must_use]
    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|backend| backend.name()).collect()
    }
}

impl DestinationResolver for FallbackResolver {
    fn resolve(&self, callsign: &str) -> Result<Location, ResolutionError> {
        if callsign.is_empty() {
            return Err(ResolutionError::EmptyCallsign);
        }
        let mut last_error = ResolutionError::NoBackends;
        for backend in &self.backends {
            match backend.resolve(callsign) {
                Ok(location) => return Ok(location),
                Err(err) => {
                    log::debug!("{} could not resolve {callsign}: {err}", backend.name());
                    last_error = err;
                }
            }
        }
        Err(last_error)
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}
