use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use davinci_flow::{FlowRequest, ResponseStatus, Transport, TransportResponse};
use serde_json::Value;

/// Answers requests from a queue of canned responses and records every request.
///
/// Cloning shares the queue, so a test can keep a handle after moving the
/// transport into a client. An exhausted queue answers like a dropped
/// connection.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<TransportResponse>>>,
    requests: Arc<Mutex<Vec<FlowRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(self, data: Value) -> Self {
        self.push(TransportResponse::Success { status: 200, data })
    }

    pub fn http_error(self, status: u16, data: Value) -> Self {
        self.push(TransportResponse::Error {
            status: ResponseStatus::Http(status),
            data,
        })
    }

    pub fn push(self, response: TransportResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<FlowRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_body(&self) -> Option<Value> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .and_then(|r| r.body.clone())
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn perform(&self, request: FlowRequest) -> TransportResponse {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(TransportResponse::Error {
                status: ResponseStatus::FetchError,
                data: Value::Null,
            })
    }
}
