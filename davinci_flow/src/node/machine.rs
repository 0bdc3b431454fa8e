use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::watch;

use super::classifier::{Transition, classify};
use super::types::{
    Authorization, CacheInfo, ClientInfo, ContinueNode, ErrorNode, FailureNode, Link, Node,
    ServerInfo, SuccessNode, SuccessServer,
};
use crate::collector::{derive_collectors, update_collector, validate_collector};
use crate::errors::FlowError;
use crate::transport::TransportResponse;

/// Caller-owned holder of the current node.
///
/// Transitions only happen through [`FlowState::receive`] / [`FlowState::apply`];
/// the only in-place mutation is a collector value update on a node that
/// has collectors. Every published node is visible to [`FlowState::subscribe`]
/// receivers.
#[derive(Debug)]
pub struct FlowState {
    node: Node,
    responses: HashMap<String, Value>,
    publisher: watch::Sender<Node>,
}

impl Default for FlowState {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowState {
    pub fn new() -> Self {
        let (publisher, _) = watch::channel(Node::Start);
        Self {
            node: Node::Start,
            responses: HashMap::new(),
            publisher,
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn subscribe(&self) -> watch::Receiver<Node> {
        self.publisher.subscribe()
    }

    /// Raw payload of the response that produced the node with `cache_key`.
    pub fn cached_response(&self, cache_key: &str) -> Option<&Value> {
        self.responses.get(cache_key)
    }

    /// Classifies a settled response and applies the resulting transition.
    pub fn receive(&mut self, cache_key: String, response: &TransportResponse) -> &Node {
        self.responses
            .insert(cache_key.clone(), response.data().clone());
        let transition = classify(response);
        self.apply(cache_key, transition)
    }

    pub fn apply(&mut self, cache_key: String, transition: Transition) -> &Node {
        let previous = self.node.status();
        tracing::debug!("Applying {} transition to {} node", transition.name(), previous);
        let cache = CacheInfo { key: cache_key };

        let next = match transition {
            Transition::Continue {
                payload,
                http_status,
            } => Node::Continue(continue_node(cache, &payload, http_status)),
            Transition::Error { error, http_status } => {
                // The node stays alive: keep what the user entered and where to resubmit.
                let (client, server) = match std::mem::take(&mut self.node) {
                    Node::Continue(n) => (n.client, n.server),
                    Node::Error(n) => (n.client, n.server),
                    other => {
                        tracing::warn!(
                            "Recoverable error received while in {} state",
                            other.status()
                        );
                        (ClientInfo::default(), ServerInfo::default())
                    }
                };
                Node::Error(ErrorNode {
                    cache,
                    client,
                    server,
                    error,
                    http_status,
                })
            }
            Transition::Failure { error, http_status } => {
                tracing::warn!("Flow failed with {}: {}", error.code, error.message);
                Node::Failure(FailureNode {
                    cache,
                    error,
                    http_status,
                })
            }
            Transition::Success {
                payload,
                http_status,
            } => Node::Success(success_node(cache, &payload, http_status)),
        };

        tracing::info!(
            "Node transition: {} -> {} (cache key {})",
            previous,
            next.status(),
            next.cache_key().unwrap_or_default()
        );
        self.node = next;
        self.publish();
        &self.node
    }

    /// Replaces the working value of one collector on the current node.
    pub fn update(&mut self, id: &str, value: Option<Value>) -> Result<(), FlowError> {
        let status = self.node.status();
        let client = self.node.client_mut().ok_or_else(|| {
            FlowError::InvalidState(format!("cannot update collector {id} on a {status} node"))
        })?;
        client.collectors = update_collector(&client.collectors, id, value)?;
        self.publish();
        Ok(())
    }

    pub fn validate(&self, id: &str) -> Result<Vec<String>, FlowError> {
        let collectors = self.node.collectors().ok_or_else(|| {
            FlowError::InvalidState(format!(
                "cannot validate collector {id} on a {} node",
                self.node.status()
            ))
        })?;
        Ok(validate_collector(collectors, id)?)
    }

    /// Explicit restart: back to `start`, dropping cached payloads.
    pub fn reset(&mut self) {
        tracing::debug!("Resetting flow from {} state", self.node.status());
        self.node = Node::Start;
        self.responses.clear();
        self.publish();
    }

    fn publish(&self) {
        self.publisher.send_replace(self.node.clone());
    }
}

fn text(payload: &Value, pointer: &str) -> Option<String> {
    payload
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn server_info(payload: &Value) -> ServerInfo {
    let links = payload
        .get("_links")
        .and_then(Value::as_object)
        .map(|links| {
            links
                .iter()
                .filter_map(|(name, link)| {
                    let href = link.get("href")?.as_str()?;
                    Some((
                        name.clone(),
                        Link {
                            href: href.to_string(),
                        },
                    ))
                })
                .collect()
        })
        .unwrap_or_default();

    ServerInfo {
        id: text(payload, "/id"),
        interaction_id: text(payload, "/interactionId"),
        interaction_token: text(payload, "/interactionToken"),
        event_name: text(payload, "/eventName"),
        links,
    }
}

fn continue_node(cache: CacheInfo, payload: &Value, http_status: u16) -> ContinueNode {
    let fields = payload
        .pointer("/form/components/fields")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let form_data = payload.pointer("/formData/value").and_then(Value::as_object);

    // Default action: the first submit button, else the event that produced this node.
    let action = fields
        .iter()
        .find(|f| f.get("type").and_then(Value::as_str) == Some("SUBMIT_BUTTON"))
        .and_then(|f| f.get("key").and_then(Value::as_str))
        .map(str::to_string)
        .or_else(|| text(payload, "/eventName"))
        .unwrap_or_default();

    ContinueNode {
        cache,
        client: ClientInfo {
            action,
            collectors: derive_collectors(fields, form_data),
            name: text(payload, "/form/name"),
            description: text(payload, "/form/description"),
        },
        server: server_info(payload),
        http_status,
    }
}

fn success_node(cache: CacheInfo, payload: &Value, http_status: u16) -> SuccessNode {
    let authorization = payload.get("authorizeResponse").map(|_| Authorization {
        code: text(payload, "/authorizeResponse/code"),
        state: text(payload, "/authorizeResponse/state"),
    });

    SuccessNode {
        cache,
        authorization,
        server: SuccessServer {
            session: text(payload, "/session/id"),
            id: text(payload, "/id"),
            interaction_id: text(payload, "/interactionId"),
            event_name: text(payload, "/eventName"),
        },
        http_status,
    }
}
