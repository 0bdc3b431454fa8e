use async_trait::async_trait;
use http::{HeaderMap, Method};
use serde_json::Value;

/// One request the flow engine wants performed.
#[derive(Debug, Clone)]
pub struct FlowRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

/// Status of an errored transport call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Http(u16),
    /// The request never produced an HTTP response (CORS, DNS, refused connection...).
    FetchError,
}

/// The single settled envelope a transport returns per call.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportResponse {
    Success { status: u16, data: Value },
    Error { status: ResponseStatus, data: Value },
}

impl TransportResponse {
    pub fn data(&self) -> &Value {
        match self {
            Self::Success { data, .. } | Self::Error { data, .. } => data,
        }
    }
}

/// Performs HTTP calls on behalf of the flow engine.
///
/// Implementations never fail: anything that goes wrong is folded into a
/// `TransportResponse::Error`, so classification stays total.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn perform(&self, request: FlowRequest) -> TransportResponse;
}
