use serde::Serialize;
use serde_json::{Map, Value};

use super::types::{ClientInfo, Node, ServerInfo};
use crate::collector::Collector;
use crate::errors::FlowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Submit,
    Action,
}

/// Body the server expects on `_links.next.href`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaVinciRequest {
    pub id: String,
    pub event_name: String,
    pub interaction_id: String,
    pub parameters: RequestParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestParameters {
    pub event_type: EventType,
    pub data: RequestData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestData {
    pub action_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_data: Option<Map<String, Value>>,
}

fn parts(node: &Node) -> Result<(&ClientInfo, &ServerInfo), FlowError> {
    match (node.client(), node.server()) {
        (Some(client), Some(server)) => Ok((client, server)),
        _ => Err(FlowError::InvalidState(format!(
            "no request can be built from a {} node",
            node.status()
        ))),
    }
}

fn envelope(
    server: &ServerInfo,
    event_type: EventType,
    action_key: String,
    form_data: Option<Map<String, Value>>,
) -> DaVinciRequest {
    DaVinciRequest {
        id: server.id.clone().unwrap_or_default(),
        event_name: server.event_name.clone().unwrap_or_default(),
        interaction_id: server.interaction_id.clone().unwrap_or_default(),
        parameters: RequestParameters {
            event_type,
            data: RequestData {
                action_key,
                form_data,
            },
        },
    }
}

/// Folds every value-bearing collector's working value into `formData`.
///
/// Uses `input.value`, never the display default in `output`. Action and
/// read-only collectors are left out.
pub fn build_submit_request(node: &Node) -> Result<DaVinciRequest, FlowError> {
    let (client, server) = parts(node)?;

    let form_data: Map<String, Value> = client
        .collectors
        .iter()
        .filter(|c| {
            matches!(
                c,
                Collector::SingleValueCollector(_)
                    | Collector::ValidatedSingleValueCollector(_)
                    | Collector::MultiValueCollector(_)
                    | Collector::ObjectValueCollector(_)
            )
        })
        .filter_map(|c| Some((c.name().to_string(), c.input_value()?)))
        .collect();

    tracing::debug!(
        "Building submit request for action {} with {} field(s)",
        client.action,
        form_data.len()
    );

    Ok(envelope(
        server,
        EventType::Submit,
        client.action.clone(),
        Some(form_data),
    ))
}

/// Same envelope as a submit but carrying only `action_key`.
pub fn build_action_request(node: &Node, action_key: &str) -> Result<DaVinciRequest, FlowError> {
    let (_, server) = parts(node)?;
    Ok(envelope(
        server,
        EventType::Action,
        action_key.to_string(),
        None,
    ))
}
