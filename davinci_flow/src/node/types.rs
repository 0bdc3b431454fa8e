use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collector::Collector;

/// Code carried by a server error; DaVinci mixes numeric and string codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Number(i64),
    Text(String),
}

impl ErrorCode {
    pub(crate) fn unknown() -> Self {
        Self::Text("unknown".to_string())
    }

    pub(crate) fn from_value(value: Option<&Value>) -> Option<Self> {
        match value? {
            Value::Number(n) => n.as_i64().map(Self::Number),
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorStatus {
    Error,
    Failure,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    DavinciError,
    NetworkError,
    UnknownError,
}

/// Field-level sub-error reported by the server for invalid input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorErrorDetail {
    pub code: String,
    pub message: String,
    pub target: String,
}

/// Structured error attached to `error` and `failure` nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaVinciError {
    pub code: ErrorCode,
    pub message: String,
    pub status: ErrorStatus,
    #[serde(rename = "type")]
    pub error_type: ErrorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_http_status: Option<u16>,
    #[serde(default)]
    pub collectors: Vec<CollectorErrorDetail>,
}

/// Correlates a node with the raw payload of the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheInfo {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

/// Server-side correlation fields of a continue / error node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub id: Option<String>,
    pub interaction_id: Option<String>,
    pub interaction_token: Option<String>,
    pub event_name: Option<String>,
    /// Named follow-up links (`_links` on the wire).
    #[serde(rename = "_links")]
    pub links: BTreeMap<String, Link>,
}

impl ServerInfo {
    pub fn link(&self, name: &str) -> Option<&str> {
        self.links.get(name).map(|l| l.href.as_str())
    }

    pub fn next_href(&self) -> Option<&str> {
        self.link("next")
    }
}

/// Client-facing state of a node that still expects input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Default submit action key.
    pub action: String,
    pub collectors: Vec<Collector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueNode {
    pub cache: CacheInfo,
    pub client: ClientInfo,
    pub server: ServerInfo,
    pub http_status: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorNode {
    pub cache: CacheInfo,
    pub client: ClientInfo,
    pub server: ServerInfo,
    pub error: DaVinciError,
    pub http_status: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureNode {
    pub cache: CacheInfo,
    pub error: DaVinciError,
    /// Absent when the request never reached the server.
    pub http_status: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    pub code: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessServer {
    pub session: Option<String>,
    pub id: Option<String>,
    pub interaction_id: Option<String>,
    pub event_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessNode {
    pub cache: CacheInfo,
    pub authorization: Option<Authorization>,
    pub server: SuccessServer,
    pub http_status: u16,
}

/// Where the flow currently is. Exactly one variant is active at a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Node {
    #[default]
    Start,
    Continue(ContinueNode),
    Error(ErrorNode),
    Failure(FailureNode),
    Success(SuccessNode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Start,
    Continue,
    Error,
    Failure,
    Success,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Continue => "continue",
            Self::Error => "error",
            Self::Failure => "failure",
            Self::Success => "success",
        };
        f.write_str(name)
    }
}

impl Node {
    pub fn status(&self) -> NodeStatus {
        match self {
            Self::Start => NodeStatus::Start,
            Self::Continue(_) => NodeStatus::Continue,
            Self::Error(_) => NodeStatus::Error,
            Self::Failure(_) => NodeStatus::Failure,
            Self::Success(_) => NodeStatus::Success,
        }
    }

    pub fn cache_key(&self) -> Option<&str> {
        match self {
            Self::Start => None,
            Self::Continue(n) => Some(&n.cache.key),
            Self::Error(n) => Some(&n.cache.key),
            Self::Failure(n) => Some(&n.cache.key),
            Self::Success(n) => Some(&n.cache.key),
        }
    }

    /// Present only on `continue` and `error` nodes.
    pub fn collectors(&self) -> Option<&[Collector]> {
        self.client().map(|c| c.collectors.as_slice())
    }

    /// Present only on `error` and `failure` nodes.
    pub fn error(&self) -> Option<&DaVinciError> {
        match self {
            Self::Error(n) => Some(&n.error),
            Self::Failure(n) => Some(&n.error),
            _ => None,
        }
    }

    pub fn client(&self) -> Option<&ClientInfo> {
        match self {
            Self::Continue(n) => Some(&n.client),
            Self::Error(n) => Some(&n.client),
            _ => None,
        }
    }

    pub fn server(&self) -> Option<&ServerInfo> {
        match self {
            Self::Continue(n) => Some(&n.server),
            Self::Error(n) => Some(&n.server),
            _ => None,
        }
    }

    pub(crate) fn client_mut(&mut self) -> Option<&mut ClientInfo> {
        match self {
            Self::Continue(n) => Some(&mut n.client),
            Self::Error(n) => Some(&mut n.client),
            _ => None,
        }
    }
}
