//! Response classification.
//!
//! Every settled transport envelope maps to exactly one `Transition`. The
//! rules are evaluated in a fixed order and the last one is a catch-all, so
//! no response shape is ever left unhandled.

use serde_json::Value;

use super::types::{CollectorErrorDetail, DaVinciError, ErrorCode, ErrorStatus, ErrorType};
use crate::transport::{ResponseStatus, TransportResponse};

const FETCH_ERROR_MESSAGE: &str = "The request failed before reaching the server, \
    most likely a CORS rejection. Please ensure a correct Client ID for your OAuth \
    application and that this origin is allowed.";
const SERVER_ERROR_MESSAGE: &str = "An unexpected server error occurred";
const CLIENT_ERROR_MESSAGE: &str = "The request was rejected by the server";
const UNKNOWN_SHAPE_MESSAGE: &str = "Unrecognized response received from the server";

const TERMINAL_CONNECTOR: &str = "pingOneAuthenticationConnector";
const TERMINAL_CAPABILITIES: [&str; 2] = ["returnSuccessResponseRedirect", "setSession"];
const INVALID_DATA: &str = "INVALID_DATA";

/// Intent produced for one response, applied by the node state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Next node; collectors are rebuilt from `payload`.
    Continue { payload: Value, http_status: u16 },
    /// Recoverable: the current node stays alive with this error attached.
    Error {
        error: DaVinciError,
        http_status: u16,
    },
    /// Unrecoverable: the flow must be restarted.
    Failure {
        error: DaVinciError,
        http_status: Option<u16>,
    },
    Success { payload: Value, http_status: u16 },
}

impl Transition {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Continue { .. } => "continue",
            Self::Error { .. } => "error",
            Self::Failure { .. } => "failure",
            Self::Success { .. } => "success",
        }
    }
}

/// Classifies one transport envelope. Pure: equal inputs give equal outputs.
pub fn classify(response: &TransportResponse) -> Transition {
    let (http_status, data) = match response {
        TransportResponse::Error {
            status: ResponseStatus::FetchError,
            ..
        } => {
            return Transition::Failure {
                error: DaVinciError {
                    code: ErrorCode::Text("FETCH_ERROR".to_string()),
                    message: FETCH_ERROR_MESSAGE.to_string(),
                    status: ErrorStatus::Failure,
                    error_type: ErrorType::NetworkError,
                    internal_http_status: None,
                    collectors: Vec::new(),
                },
                http_status: None,
            };
        }
        TransportResponse::Error {
            status: ResponseStatus::Http(status),
            data,
        } => (*status, data),
        TransportResponse::Success { status, data } => (*status, data),
    };

    if http_status >= 500 {
        return failure(server_error(data, http_status, SERVER_ERROR_MESSAGE), http_status);
    }

    if (400..500).contains(&http_status) {
        return classify_client_error(data, http_status);
    }

    if !(200..300).contains(&http_status) {
        return failure(unknown_shape(http_status), http_status);
    }

    if has_key(data, "error") {
        let source = data.get("error").filter(|e| e.is_object()).unwrap_or(data);
        return failure(server_error(source, http_status, SERVER_ERROR_MESSAGE), http_status);
    }

    let reported_failure = data
        .get("status")
        .and_then(Value::as_str)
        .is_some_and(|s| s.eq_ignore_ascii_case("failure"));
    if reported_failure {
        return failure(server_error(data, http_status, SERVER_ERROR_MESSAGE), http_status);
    }

    if has_key(data, "session") || has_key(data, "authorizeResponse") {
        return Transition::Success {
            payload: data.clone(),
            http_status,
        };
    }

    if data.pointer("/_links/next/href").and_then(Value::as_str).is_some() {
        return Transition::Continue {
            payload: data.clone(),
            http_status,
        };
    }

    failure(unknown_shape(http_status), http_status)
}

fn classify_client_error(data: &Value, http_status: u16) -> Transition {
    let code = ErrorCode::from_value(data.get("code"));
    let unrecoverable_code = is_unrecoverable_code(code.as_ref());

    let connector = data.get("connectorId").and_then(Value::as_str);
    let capability = data.get("capabilityName").and_then(Value::as_str);
    let terminal_connector = connector == Some(TERMINAL_CONNECTOR)
        && capability.is_some_and(|c| TERMINAL_CAPABILITIES.contains(&c));

    if unrecoverable_code || terminal_connector {
        return failure(server_error(data, http_status, CLIENT_ERROR_MESSAGE), http_status);
    }

    let mut error = server_error(data, http_status, CLIENT_ERROR_MESSAGE);
    error.status = ErrorStatus::Error;
    Transition::Error { error, http_status }
}

fn is_unrecoverable_code(code: Option<&ErrorCode>) -> bool {
    match code {
        Some(ErrorCode::Number(n)) => *n == 1999,
        Some(ErrorCode::Text(s)) => s == "1999" || s == "requestTimedOut",
        None => false,
    }
}

fn failure(error: DaVinciError, http_status: u16) -> Transition {
    Transition::Failure {
        error,
        http_status: Some(http_status),
    }
}

fn has_key(data: &Value, key: &str) -> bool {
    data.as_object().is_some_and(|o| o.contains_key(key))
}

/// Structured error from a server payload. The body's `httpResponseCode`
/// wins over the transport status for `internal_http_status`.
fn server_error(data: &Value, http_status: u16, fallback_message: &str) -> DaVinciError {
    let internal_http_status = data
        .get("httpResponseCode")
        .and_then(Value::as_u64)
        .and_then(|c| u16::try_from(c).ok())
        .unwrap_or(http_status);

    DaVinciError {
        code: ErrorCode::from_value(data.get("code")).unwrap_or_else(ErrorCode::unknown),
        message: data
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or(fallback_message)
            .to_string(),
        status: ErrorStatus::Failure,
        error_type: ErrorType::DavinciError,
        internal_http_status: Some(internal_http_status),
        collectors: collector_errors(data),
    }
}

fn unknown_shape(http_status: u16) -> DaVinciError {
    DaVinciError {
        code: ErrorCode::unknown(),
        message: UNKNOWN_SHAPE_MESSAGE.to_string(),
        status: ErrorStatus::Failure,
        error_type: ErrorType::UnknownError,
        internal_http_status: Some(http_status),
        collectors: Vec::new(),
    }
}

/// Field-level errors, read only from `details[].rawResponse` entries whose
/// code is `INVALID_DATA`. Any other nesting yields nothing.
fn collector_errors(data: &Value) -> Vec<CollectorErrorDetail> {
    let Some(details) = data.get("details").and_then(Value::as_array) else {
        return Vec::new();
    };

    details
        .iter()
        .filter_map(|detail| detail.get("rawResponse"))
        .filter(|raw| raw.get("code").and_then(Value::as_str) == Some(INVALID_DATA))
        .filter_map(|raw| raw.get("details").and_then(Value::as_array))
        .flatten()
        .map(|item| {
            let text = |name: &str| {
                item.get(name)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            CollectorErrorDetail {
                code: text("code"),
                message: text("message"),
                target: text("target"),
            }
        })
        .collect()
}
