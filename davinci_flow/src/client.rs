use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde_json::{Value, json};
use tokio::sync::watch;
use url::Url;

use crate::collector::{Collector, CollectorError, CollectorType};
use crate::config::FlowConfig;
use crate::errors::FlowError;
use crate::node::{
    DaVinciError, DaVinciRequest, FlowState, Node, build_action_request, build_submit_request,
};
use crate::storage::{FlowStorage, InMemoryFlowStorage};
use crate::transport::{FlowRequest, ReqwestTransport, Transport};
use crate::utils::{gen_random_string, pkce_challenge};

const INTERACTION_TOKEN_HEADER: HeaderName = HeaderName::from_static("interactiontoken");
const CONTINUE_URL_KEY: &str = "continueUrl";

/// `state` and PKCE verifier of the last authorize request, kept for the
/// caller's token exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationContext {
    pub state: String,
    pub code_verifier: String,
}

/// One flow instance.
///
/// Request-issuing methods take `&mut self`, so at most one request is in
/// flight per client and every response lands on the node it was issued from.
pub struct DaVinciClient<T = ReqwestTransport, S = InMemoryFlowStorage> {
    config: FlowConfig,
    transport: T,
    storage: S,
    state: FlowState,
    authorization: Option<AuthorizationContext>,
}

impl DaVinciClient {
    /// Client over HTTP with an in-memory continuation slot.
    pub fn new(config: FlowConfig) -> Result<Self, FlowError> {
        let transport = ReqwestTransport::new(config.request_timeout)?;
        Ok(Self::with_parts(config, transport, InMemoryFlowStorage::new()))
    }
}

impl<T: Transport, S: FlowStorage> DaVinciClient<T, S> {
    pub fn with_parts(config: FlowConfig, transport: T, storage: S) -> Self {
        Self {
            config,
            transport,
            storage,
            state: FlowState::new(),
            authorization: None,
        }
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn node(&self) -> &Node {
        self.state.node()
    }

    /// Collectors of the current node; empty when the node has none.
    pub fn collectors(&self) -> &[Collector] {
        self.state.node().collectors().unwrap_or_default()
    }

    pub fn error(&self) -> Option<&DaVinciError> {
        self.state.node().error()
    }

    pub fn subscribe(&self) -> watch::Receiver<Node> {
        self.state.subscribe()
    }

    pub fn cached_response(&self, cache_key: &str) -> Option<&Value> {
        self.state.cached_response(cache_key)
    }

    pub fn authorization_context(&self) -> Option<&AuthorizationContext> {
        self.authorization.as_ref()
    }

    pub fn reset(&mut self) {
        self.state.reset();
        self.authorization = None;
    }

    /// Starts a new flow with the authorize request.
    ///
    /// `query` is appended to the standard parameters (e.g. `acr_values`).
    pub async fn start(&mut self, query: &[(&str, &str)]) -> Result<&Node, FlowError> {
        self.state.reset();
        let (url, authorization) = self.authorize_url(query)?;
        self.authorization = Some(authorization);

        tracing::info!("Starting flow for client {}", self.config.client_id);
        self.dispatch(FlowRequest {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
            body: None,
        })
        .await
    }

    /// Submits the current node's collector values with its default action.
    pub async fn next(&mut self) -> Result<&Node, FlowError> {
        let body = build_submit_request(self.state.node())?;
        let request = self.next_request(&body)?;
        self.dispatch(request).await
    }

    /// Triggers `action_key` (a flow link or button) without form data.
    pub async fn flow(&mut self, action_key: &str) -> Result<&Node, FlowError> {
        let body = build_action_request(self.state.node(), action_key)?;
        let request = self.next_request(&body)?;
        self.dispatch(request).await
    }

    pub fn update(&mut self, id: &str, value: Option<Value>) -> Result<(), FlowError> {
        self.state.update(id, value)
    }

    pub fn validate(&self, id: &str) -> Result<Vec<String>, FlowError> {
        self.state.validate(id)
    }

    /// Prepares a social-login redirect for the IdP collector `id`.
    ///
    /// Persists the node's `continue` link so the flow can be resumed after
    /// the redirect, and returns where to send the user (`None` when the
    /// server gave no target).
    pub async fn prepare_external_idp(&self, id: &str) -> Result<Option<String>, FlowError> {
        let collector = self
            .collectors()
            .iter()
            .find(|c| c.id() == id)
            .ok_or_else(|| CollectorError::NotFound(id.to_string()))?;

        let url = match collector {
            Collector::ActionCollector(c) if c.collector_type == CollectorType::IdpCollector => {
                c.output.url.clone().flatten()
            }
            other => {
                return Err(FlowError::InvalidState(format!(
                    "collector {} is a {:?}, not an IdP collector",
                    id,
                    other.collector_type()
                )));
            }
        };

        let continue_url = self
            .state
            .node()
            .server()
            .and_then(|s| s.link("continue"))
            .ok_or_else(|| {
                FlowError::InvalidState("current node has no continue link".to_string())
            })?;

        self.storage
            .set(json!({ CONTINUE_URL_KEY: continue_url }))
            .await?;
        tracing::debug!("Stored continue url for external IdP {}", id);

        if url.is_none() {
            tracing::warn!("IdP collector {} has no authenticate link", id);
        }
        Ok(url)
    }

    /// Reads and clears the continuation stored by [`Self::prepare_external_idp`].
    pub async fn take_pending_continue_url(&self) -> Result<Option<String>, FlowError> {
        let stored = self.storage.get().await?;
        if stored.is_some() {
            self.storage.remove().await?;
        }
        Ok(stored
            .as_ref()
            .and_then(|v| v.get(CONTINUE_URL_KEY))
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn authorize_url(
        &self,
        query: &[(&str, &str)],
    ) -> Result<(String, AuthorizationContext), FlowError> {
        let state = gen_random_string(32)?;
        let code_verifier = gen_random_string(32)?;
        let code_challenge = pkce_challenge(&code_verifier);

        let mut url = Url::parse(&self.config.authorize_endpoint).map_err(|e| {
            FlowError::Config(format!(
                "Invalid authorize endpoint {}: {}",
                self.config.authorize_endpoint, e
            ))
        })?;
        url.query_pairs_mut()
            .append_pair("response_mode", &self.config.response_mode)
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", &self.config.scope)
            .append_pair("response_type", "code")
            .append_pair("state", &state)
            .append_pair("code_challenge", &code_challenge)
            .append_pair("code_challenge_method", "S256")
            .extend_pairs(query);

        Ok((
            url.into(),
            AuthorizationContext {
                state,
                code_verifier,
            },
        ))
    }

    fn next_request(&self, body: &DaVinciRequest) -> Result<FlowRequest, FlowError> {
        let node = self.state.node();
        let server = node.server().ok_or_else(|| {
            FlowError::InvalidState(format!("cannot continue from a {} node", node.status()))
        })?;
        let url = server.next_href().ok_or_else(|| {
            FlowError::InvalidState("current node has no next link".to_string())
        })?;

        let mut headers = HeaderMap::new();
        if let Some(token) = &server.interaction_token {
            let value = HeaderValue::from_str(token).map_err(|_| {
                FlowError::InvalidState("interaction token is not a valid header value".into())
            })?;
            headers.insert(INTERACTION_TOKEN_HEADER, value);
        }

        Ok(FlowRequest {
            method: Method::POST,
            url: url.to_string(),
            headers,
            body: Some(serde_json::to_value(body)?),
        })
    }

    async fn dispatch(&mut self, request: FlowRequest) -> Result<&Node, FlowError> {
        let cache_key = uuid::Uuid::new_v4().to_string();
        tracing::debug!("Dispatching request {} to {}", cache_key, request.url);

        let response = self.transport.perform(request).await;
        Ok(self.state.receive(cache_key, &response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeStatus;
    use crate::transport::TransportResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records requests and answers with one fixed response.
    struct FixedTransport {
        response: TransportResponse,
        requests: Mutex<Vec<FlowRequest>>,
    }

    impl FixedTransport {
        fn new(data: Value) -> Self {
            Self {
                response: TransportResponse::Success { status: 200, data },
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for FixedTransport {
        async fn perform(&self, request: FlowRequest) -> TransportResponse {
            self.requests.lock().unwrap().push(request);
            self.response.clone()
        }
    }

    fn config() -> FlowConfig {
        FlowConfig {
            client_id: "client-1".to_string(),
            redirect_uri: "https://app.example.com/cb".to_string(),
            authorize_endpoint: "https://auth.example.com/as/authorize".to_string(),
            scope: "openid profile".to_string(),
            response_mode: "pi.flow".to_string(),
            request_timeout: std::time::Duration::from_secs(5),
        }
    }

    fn idp_payload() -> Value {
        json!({
            "_links": {
                "next": {"href": "https://auth.example.com/next"},
                "continue": {"href": "https://auth.example.com/continue"}
            },
            "interactionId": "int-1",
            "interactionToken": "tok-1",
            "form": {"components": {"fields": [
                {"type": "SOCIAL_LOGIN_BUTTON", "key": "google", "label": "Google",
                 "links": {"authenticate": {"href": "https://idp.example.com/auth"}}},
                {"type": "SOCIAL_LOGIN_BUTTON", "key": "apple", "label": "Apple"},
                {"type": "TEXT", "key": "username", "label": "Username"}
            ]}}
        })
    }

    fn client(data: Value) -> DaVinciClient<FixedTransport, InMemoryFlowStorage> {
        DaVinciClient::with_parts(config(), FixedTransport::new(data), InMemoryFlowStorage::new())
    }

    #[tokio::test]
    async fn test_start_builds_authorize_request() {
        // Given a client with a configured authorize endpoint
        let mut client = client(idp_payload());

        // When starting with an extra query parameter
        let status = client.start(&[("acr_values", "login")]).await.unwrap().status();

        // Then a GET with OAuth and PKCE parameters is sent
        assert_eq!(status, NodeStatus::Continue);
        let requests = client.transport.requests.lock().unwrap();
        let url = Url::parse(&requests[0].url).unwrap();
        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        let context = client.authorization_context().unwrap();

        assert_eq!(requests[0].method, Method::GET);
        assert_eq!(pairs["response_mode"], "pi.flow");
        assert_eq!(pairs["client_id"], "client-1");
        assert_eq!(pairs["scope"], "openid profile");
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["acr_values"], "login");
        assert_eq!(pairs["state"], context.state);
        assert_eq!(pairs["code_challenge"], pkce_challenge(&context.code_verifier));
        assert_eq!(pairs["code_challenge_method"], "S256");
    }

    #[tokio::test]
    async fn test_next_posts_to_next_link_with_token() {
        let mut client = client(idp_payload());
        client.start(&[]).await.unwrap();
        client.update("username-2", Some(json!("ada"))).unwrap();

        client.next().await.unwrap();

        let requests = client.transport.requests.lock().unwrap();
        let request = &requests[1];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, "https://auth.example.com/next");
        assert_eq!(request.headers[&INTERACTION_TOKEN_HEADER], "tok-1");
        let body = request.body.as_ref().unwrap();
        assert_eq!(body["parameters"]["eventType"], json!("submit"));
        assert_eq!(body["parameters"]["data"]["formData"]["username"], json!("ada"));
    }

    #[tokio::test]
    async fn test_next_before_start_is_invalid_state() {
        let mut client = client(idp_payload());

        let result = client.next().await;

        assert!(matches!(result, Err(FlowError::InvalidState(_))));
        assert!(client.transport.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_flow_without_next_link_sends_nothing() {
        let mut client = client(json!({
            "_links": {"self": {"href": "https://auth.example.com/self"}},
            "form": {"components": {"fields": []}}
        }));
        // A continue node needs a next link, so this payload is a failure
        client.start(&[]).await.unwrap();
        assert_eq!(client.node().status(), NodeStatus::Failure);

        let result = client.flow("register").await;

        assert!(matches!(result, Err(FlowError::InvalidState(_))));
        assert_eq!(client.transport.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_prepare_external_idp_stores_continue_url() {
        // Given a node with an IdP button
        let mut client = client(idp_payload());
        client.start(&[]).await.unwrap();

        // When preparing the redirect
        let url = client.prepare_external_idp("google-0").await.unwrap();

        // Then the navigation target is returned and the continuation is stored once
        assert_eq!(url.as_deref(), Some("https://idp.example.com/auth"));
        assert_eq!(
            client.take_pending_continue_url().await.unwrap().as_deref(),
            Some("https://auth.example.com/continue")
        );
        assert_eq!(client.take_pending_continue_url().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_prepare_external_idp_without_target() {
        let mut client = client(idp_payload());
        client.start(&[]).await.unwrap();

        let url = client.prepare_external_idp("apple-1").await.unwrap();

        assert_eq!(url, None);
    }

    #[tokio::test]
    async fn test_prepare_external_idp_rejects_other_collectors() {
        let mut client = client(idp_payload());
        client.start(&[]).await.unwrap();

        assert!(matches!(
            client.prepare_external_idp("username-2").await,
            Err(FlowError::InvalidState(_))
        ));
        assert!(matches!(
            client.prepare_external_idp("missing-9").await,
            Err(FlowError::Collector(CollectorError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_invalid_authorize_endpoint() {
        let mut config = config();
        config.authorize_endpoint = "not a url".to_string();
        let mut client = DaVinciClient::with_parts(
            config,
            FixedTransport::new(Value::Null),
            InMemoryFlowStorage::new(),
        );

        let result = client.start(&[]).await;

        assert!(matches!(result, Err(FlowError::Config(_))));
    }

    #[tokio::test]
    async fn test_reset_clears_authorization() {
        let mut client = client(idp_payload());
        client.start(&[]).await.unwrap();

        client.reset();

        assert_eq!(client.node(), &Node::Start);
        assert!(client.authorization_context().is_none());
        assert!(client.collectors().is_empty());
    }
}
