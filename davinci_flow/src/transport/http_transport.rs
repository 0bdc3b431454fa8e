use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::errors::TransportError;
use super::types::{FlowRequest, ResponseStatus, Transport, TransportResponse};

/// [`Transport`] over `reqwest`, keeping cookies between calls so the
/// server-side flow session survives from one node to the next.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn perform(&self, request: FlowRequest) -> TransportResponse {
        tracing::debug!("{} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers)
            .header(http::header::ACCEPT, "application/json");
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Request to {} failed before a response: {}", request.url, e);
                return TransportResponse::Error {
                    status: ResponseStatus::FetchError,
                    data: Value::Null,
                };
            }
        };

        let status = response.status().as_u16();
        let data = match response.text().await {
            Ok(text) if text.trim().is_empty() => Value::Null,
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!("Response body from {} is not JSON: {}", request.url, e);
                Value::Null
            }),
            Err(e) => {
                tracing::warn!("Failed to read response body from {}: {}", request.url, e);
                Value::Null
            }
        };

        if (200..300).contains(&status) {
            TransportResponse::Success { status, data }
        } else {
            tracing::debug!("{} responded with HTTP {}", request.url, status);
            TransportResponse::Error {
                status: ResponseStatus::Http(status),
                data,
            }
        }
    }
}
