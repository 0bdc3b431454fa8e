//! Error types for the davinci_flow crate

use thiserror::Error;

use crate::collector::CollectorError;
use crate::fido::FidoError;
use crate::storage::StorageError;
use crate::transport::TransportError;
use crate::utils::UtilError;

/// Errors surfaced by [`crate::DaVinciClient`] and [`crate::FlowState`].
///
/// Server outcomes (`error`, `failure`) are nodes, not `FlowError`s.
#[derive(Error, Debug)]
pub enum FlowError {
    /// Operation not possible on the current node
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Collector error: {0}")]
    Collector(CollectorError),

    #[error("FIDO error: {0}")]
    Fido(FidoError),

    #[error("Storage error: {0}")]
    Storage(StorageError),

    #[error("Transport error: {0}")]
    Transport(TransportError),

    #[error("Utils error: {0}")]
    Utils(UtilError),

    #[error("Json conversion(Serde) error: {0}")]
    Serde(String),
}

impl FlowError {
    /// Log the error and return self
    pub fn log(self) -> Self {
        match &self {
            Self::InvalidState(message) => tracing::error!("Invalid state: {}", message),
            Self::Config(message) => tracing::error!("Configuration error: {}", message),
            Self::Collector(err) => tracing::error!("Collector error: {}", err),
            Self::Fido(err) => tracing::error!("FIDO error: {}", err),
            Self::Storage(err) => tracing::error!("Storage error: {}", err),
            Self::Transport(err) => tracing::error!("Transport error: {}", err),
            Self::Utils(err) => tracing::error!("Utils error: {}", err),
            Self::Serde(message) => tracing::error!("Json conversion(Serde) error: {}", message),
        }
        self
    }
}

// Conversions log at the point the error crosses into the flow layer

impl From<CollectorError> for FlowError {
    fn from(err: CollectorError) -> Self {
        let error = Self::Collector(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<FidoError> for FlowError {
    fn from(err: FidoError) -> Self {
        let error = Self::Fido(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<StorageError> for FlowError {
    fn from(err: StorageError) -> Self {
        let error = Self::Storage(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<TransportError> for FlowError {
    fn from(err: TransportError) -> Self {
        let error = Self::Transport(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<UtilError> for FlowError {
    fn from(err: UtilError) -> Self {
        let error = Self::Utils(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}
