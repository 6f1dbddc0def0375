pub mod builder;
mod constants;
pub mod types;

pub use builder::decode_report;
pub use types::{DecodeError, MessageKind, RawReport, TransmissionType};

use crate::thread_manager::SteppableTask;

/// Pipeline stage turning raw feed lines into reports for the tracker.
pub struct ReportDecoder {
    receiver: crossbeam_channel::Receiver<String>,
    sender: crossbeam_channel::Sender<RawReport>,
}
impl ReportDecoder {
    #[must_use]
    pub fn new(
        lines_receiver: crossbeam_channel::Receiver<String>,
        reports_sender: crossbeam_channel::Sender<RawReport>,
    ) -> Self {
        ReportDecoder {
            receiver: lines_receiver,
            sender: reports_sender,
        }
    }
}

impl SteppableTask for ReportDecoder {
    fn step(&mut self) -> bool {
        let Ok(line) = self.receiver.recv() else {
            log::info!("ReportDecoder: upstream disconnected");
            return false;
        };

        match decode_report(&line) {
            Ok(report) => {
                if let Err(err) = self.sender.send(report) {
                    log::error!("ReportDecoder: failed to forward report: {err}");
                    return false;
                }
            }
            Err(err) => log::debug!("Discarding message '{}': {err}", line.trim_end()),
        }

        true
    }
}
