pub mod error;

pub use error::TransportError;

use crate::config::FeedConfig;
use crate::thread_manager::SteppableTask;

use std::io::BufRead;

// Bounds how long a step blocks, so the task can notice a stop request.
const READ_TIMEOUT: std::time::Duration = std::time::Duration::from_millis(500);

/// Reads newline-delimited messages from the feed and forwards each
/// non-blank line.
pub struct Ingestor {
    reader: std::io::BufReader<std::net::TcpStream>,
    sender: crossbeam_channel::Sender<String>,
    line_buffer: Vec<u8>,
}

impl Ingestor {
    pub fn connect(
        config: &FeedConfig,
        sender: crossbeam_channel::Sender<String>,
    ) -> Result<Self, TransportError> {
        let address = config.address();
        log::info!("Connecting to feed at {address}.");
        let stream = std::net::TcpStream::connect(&address)
            .and_then(|stream| {
                stream.set_read_timeout(Some(READ_TIMEOUT))?;
                Ok(stream)
            })
            .map_err(|source| TransportError::Connect {
                address: address.clone(),
                source,
            })?;
        log::info!("Connection successful.");
        Ok(Ingestor {
            reader: std::io::BufReader::new(stream),
            sender,
            line_buffer: Vec::new(),
        })
    }

    /// Returns the next complete line, or `None` if nothing usable was read
    /// in this step. A line that is not UTF-8 is dropped on its own.
    fn read_line(&mut self) -> Result<Option<String>, TransportError> {
        match self.reader.read_until(b'\n', &mut self.line_buffer) {
            Ok(0) => Err(TransportError::Closed),
            Ok(_) => {
                let bytes = std::mem::take(&mut self.line_buffer);
                match String::from_utf8(bytes) {
                    Ok(line) => Ok(Some(line.trim_end_matches(['\r', '\n']).to_string())),
                    Err(err) => {
                        log::debug!("Ingestor: discarding line that is not UTF-8: {err}");
                        Ok(None)
                    }
                }
            }
            // a partial line stays buffered until the rest arrives
            Err(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::WouldBlock
                        | std::io::ErrorKind::TimedOut
                        | std::io::ErrorKind::Interrupted
                ) =>
            {
                Ok(None)
            }
            Err(err) => Err(TransportError::Read(err)),
        }
    }
}

impl SteppableTask for Ingestor {
    fn step(&mut self) -> bool {
        let line = match self.read_line() {
            Ok(Some(line)) => line,
            Ok(None) => return true,
            Err(err) => {
                log::error!("Ingestor: {err}");
                return false;
            }
        };

        if line.trim().is_empty() {
            return true;
        }
        if let Err(err) = self.sender.send(line) {
            log::error!("Ingestor: Failed to send to channel: {err}");
            return false;
        }
        true
    }
}
