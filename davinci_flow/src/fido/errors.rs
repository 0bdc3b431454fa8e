use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of codes a WebAuthn rejection is mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FidoErrorCode {
    NotAllowedError,
    AbortError,
    InvalidStateError,
    NotSupportedError,
    SecurityError,
    TimeoutError,
    UnknownError,
}

impl FidoErrorCode {
    /// Maps a native error name; anything unrecognised is `UnknownError`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "NotAllowedError" => Self::NotAllowedError,
            "AbortError" => Self::AbortError,
            "InvalidStateError" => Self::InvalidStateError,
            "NotSupportedError" => Self::NotSupportedError,
            "SecurityError" => Self::SecurityError,
            "TimeoutError" => Self::TimeoutError,
            _ => Self::UnknownError,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotAllowedError => "NotAllowedError",
            Self::AbortError => "AbortError",
            Self::InvalidStateError => "InvalidStateError",
            Self::NotSupportedError => "NotSupportedError",
            Self::SecurityError => "SecurityError",
            Self::TimeoutError => "TimeoutError",
            Self::UnknownError => "UnknownError",
        }
    }
}

impl fmt::Display for FidoErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed result of a failed registration or authentication.
///
/// Serializes as `{code, message, type: "fido_error"}`.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[error("{code}: {message}")]
pub struct FidoError {
    pub code: FidoErrorCode,
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: &'static str,
}

impl FidoError {
    pub const ERROR_TYPE: &'static str = "fido_error";

    pub fn new(code: FidoErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            error_type: Self::ERROR_TYPE,
        }
    }

    pub(crate) fn unknown(message: impl Into<String>) -> Self {
        Self::new(FidoErrorCode::UnknownError, message)
    }
}
