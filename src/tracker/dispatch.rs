use crate::resolver::{DestinationResolver, ResolutionError, ResolutionOutcome, ResolutionRequest};

#[derive(Debug)]
pub enum DispatchStatus {
    /// The lookup already ran and this is its result.
    Completed(ResolutionOutcome),
    /// The outcome will arrive later on the outcome channel.
    Queued,
    Rejected(ResolutionError),
}

/// How the tracker hands destination lookups off.
pub trait ResolutionDispatch: Send {
    fn dispatch(&mut self, request: ResolutionRequest) -> DispatchStatus;
}

/// Resolves on the calling thread.
pub struct InlineDispatch {
    resolver: std::sync::Arc<dyn DestinationResolver>,
}

impl InlineDispatch {
    #[must_use]
    pub fn new(resolver: std::sync::Arc<dyn DestinationResolver>) -> Self {
        InlineDispatch { resolver }
    }
}

impl ResolutionDispatch for InlineDispatch {
    fn dispatch(&mut self, request: ResolutionRequest) -> DispatchStatus {
        DispatchStatus::Completed(ResolutionOutcome::resolve_with(
            self.resolver.as_ref(),
            request,
        ))
    }
}

/// Pushes requests onto the bounded resolver worker queue without blocking.
pub struct QueuedDispatch {
    sender: crossbeam_channel::Sender<ResolutionRequest>,
}

impl QueuedDispatch {
    #[must_use]
    pub fn new(sender: crossbeam_channel::Sender<ResolutionRequest>) -> Self {
        QueuedDispatch { sender }
    }
}

impl ResolutionDispatch for QueuedDispatch {
    fn dispatch(&mut self, request: ResolutionRequest) -> DispatchStatus {
        match self.sender.try_send(request) {
            Ok(()) => DispatchStatus::Queued,
            Err(crossbeam_channel::TrySendError::Full(_)) => DispatchStatus::Rejected(
                ResolutionError::Rejected(String::from("resolver queue is full")),
            ),
            Err(crossbeam_channel::TrySendError::Disconnected(_)) => DispatchStatus::Rejected(
                ResolutionError::Rejected(String::from("resolver workers have stopped")),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DispatchStatus, QueuedDispatch, ResolutionDispatch};
    use crate::resolver::{ResolutionError, ResolutionRequest};
    use crate::types::ICAOAddress;

    fn request(callsign: &str) -> ResolutionRequest {
        ResolutionRequest {
            flight: ICAOAddress::new(1).unwrap(),
            callsign: callsign.to_string(),
        }
    }

    #[test]
    fn when_queue_has_room_then_request_is_queued() {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        let mut dispatch = QueuedDispatch::new(sender);
        assert!(matches!(
            dispatch.dispatch(request("BA123")),
            DispatchStatus::Queued
        ));
        assert_eq!(receiver.try_recv().unwrap(), request("BA123"));
    }

    #[test]
    fn when_queue_is_full_then_request_is_rejected_without_blocking() {
        let (sender, _receiver) = crossbeam_channel::bounded(1);
        let mut dispatch = QueuedDispatch::new(sender);
        let _ = dispatch.dispatch(request("BA123"));
        assert!(matches!(
            dispatch.dispatch(request("EZY42")),
            DispatchStatus::Rejected(ResolutionError::Rejected(_))
        ));
    }

    #[test]
    fn when_workers_are_gone_then_request_is_rejected() {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        drop(receiver);
        let mut dispatch = QueuedDispatch::new(sender);
        assert!(matches!(
            dispatch.dispatch(request("BA123")),
            DispatchStatus::Rejected(_)
        ));
    }
}
