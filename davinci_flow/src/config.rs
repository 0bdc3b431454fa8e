//! Flow configuration
//!
//! `FlowConfig` can be built in code or read from the process environment:
//!
//! | Variable | Required | Default |
//! |---|---|---|
//! | `DAVINCI_CLIENT_ID` | yes | |
//! | `DAVINCI_REDIRECT_URI` | yes | |
//! | `DAVINCI_AUTHORIZE_ENDPOINT` | yes | |
//! | `DAVINCI_SCOPE` | no | `openid` |
//! | `DAVINCI_RESPONSE_MODE` | no | `pi.flow` |
//! | `DAVINCI_REQUEST_TIMEOUT` | no | `30` (seconds) |

use std::{env, sync::LazyLock, time::Duration};

use crate::errors::FlowError;

const DEFAULT_SCOPE: &str = "openid";
const DEFAULT_RESPONSE_MODE: &str = "pi.flow";
const DEFAULT_REQUEST_TIMEOUT: u64 = 30;

/// Scope used when none is given explicitly.
pub static DAVINCI_SCOPE: LazyLock<String> = LazyLock::new(read_scope);

/// Response mode used when none is given explicitly.
pub static DAVINCI_RESPONSE_MODE: LazyLock<String> = LazyLock::new(read_response_mode);

/// Per-request timeout used when none is given explicitly.
pub static DAVINCI_REQUEST_TIMEOUT: LazyLock<Duration> = LazyLock::new(read_request_timeout);

fn read_scope() -> String {
    env::var("DAVINCI_SCOPE").unwrap_or_else(|_| DEFAULT_SCOPE.to_string())
}

fn read_response_mode() -> String {
    env::var("DAVINCI_RESPONSE_MODE").unwrap_or_else(|_| DEFAULT_RESPONSE_MODE.to_string())
}

fn read_request_timeout() -> Duration {
    let seconds = match env::var("DAVINCI_REQUEST_TIMEOUT").ok() {
        None => DEFAULT_REQUEST_TIMEOUT,
        Some(v) => match v.trim().parse::<u64>() {
            Ok(0) | Err(_) => {
                tracing::warn!(
                    "Invalid DAVINCI_REQUEST_TIMEOUT: {}. Using default {}",
                    v,
                    DEFAULT_REQUEST_TIMEOUT
                );
                DEFAULT_REQUEST_TIMEOUT
            }
            Ok(seconds) => seconds,
        },
    };
    Duration::from_secs(seconds)
}

fn required(name: &str) -> Result<String, FlowError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(FlowError::Config(format!("{name} must be set"))),
    }
}

/// Client registration and endpoint for one DaVinci application.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub authorize_endpoint: String,
    pub scope: String,
    pub response_mode: String,
    pub request_timeout: Duration,
}

impl FlowConfig {
    /// Creates a config with the process defaults for the optional settings.
    pub fn new(
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
        authorize_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            authorize_endpoint: authorize_endpoint.into(),
            scope: DAVINCI_SCOPE.clone(),
            response_mode: DAVINCI_RESPONSE_MODE.clone(),
            request_timeout: *DAVINCI_REQUEST_TIMEOUT,
        }
    }

    pub fn from_env() -> Result<Self, FlowError> {
        let config = Self {
            client_id: required("DAVINCI_CLIENT_ID")?,
            redirect_uri: required("DAVINCI_REDIRECT_URI")?,
            authorize_endpoint: required("DAVINCI_AUTHORIZE_ENDPOINT")?,
            scope: read_scope(),
            response_mode: read_response_mode(),
            request_timeout: read_request_timeout(),
        };
        tracing::debug!(
            "Loaded flow config for client {} (endpoint {})",
            config.client_id,
            config.authorize_endpoint
        );
        Ok(config)
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_response_mode(mut self, response_mode: impl Into<String>) -> Self {
        self.response_mode = response_mode.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
