#[derive(Debug)]
pub enum TransportError {
    Connect {
        address: String,
        source: std::io::Error,
    },
    Read(std::io::Error),
    Closed,
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Connect { address, source } => {
                write!(f, "Failed to connect to feed at {address}: {source}")
            }
            TransportError::Read(e) => write!(f, "Failed to read from feed: {e}"),
            TransportError::Closed => write!(f, "Feed closed the connection"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Connect { source, .. } => Some(source),
            TransportError::Read(e) => Some(e),
            TransportError::Closed => None,
        }
    }
}
