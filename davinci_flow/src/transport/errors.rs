use thiserror::Error;

/// Failures setting up the transport.
///
/// A request that was sent but failed is not a `TransportError`; it comes
/// back as a `TransportResponse::Error` and becomes a node.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::Client(err.to_string())
    }
}
