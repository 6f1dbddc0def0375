use super::{DestinationResolver, ResolutionOutcome, ResolutionRequest};
use crate::thread_manager::SteppableTask;

const RECEIVE_TIMEOUT: std::time::Duration = std::time::Duration::from_millis(100);

/// Takes resolution requests off the shared queue so slow lookups never hold
/// up the tracker thread.
pub struct ResolverWorker {
    resolver: std::sync::Arc<dyn DestinationResolver>,
    requests: crossbeam_channel::Receiver<ResolutionRequest>,
    outcomes: crossbeam_channel::Sender<ResolutionOutcome>,
}

impl ResolverWorker {
    #[must_use]
    pub fn new(
        resolver: std::sync::Arc<dyn DestinationResolver>,
        requests: crossbeam_channel::Receiver<ResolutionRequest>,
        outcomes: crossbeam_channel::Sender<ResolutionOutcome>,
    ) -> Self {
        ResolverWorker {
            resolver,
            requests,
            outcomes,
        }
    }
}

impl SteppableTask for ResolverWorker {
    fn step(&mut self) -> bool {
        let request = match self.requests.recv_timeout(RECEIVE_TIMEOUT) {
            Ok(request) => request,
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => return true,
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                log::info!("ResolverWorker: request queue closed");
                return false;
            }
        };

        log::debug!(
            "Resolving destination of {} ({}) via {}",
            request.callsign,
            request.flight,
            self.resolver.name()
        );
        let outcome = ResolutionOutcome::resolve_with(self.resolver.as_ref(), request);
        if let Err(err) = self.outcomes.send(outcome) {
            log::warn!(
                "ResolverWorker: tracker gone, dropping outcome for {}",
                err.into_inner().callsign
            );
            return false;
        }
        true
    }
}
