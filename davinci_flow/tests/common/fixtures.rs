use std::time::Duration;

use davinci_flow::{DaVinciClient, FlowConfig, InMemoryFlowStorage};
use serde_json::{Value, json};

use super::ScriptedTransport;

pub const NEXT_HREF: &str = "https://auth.example.com/customForm/next";

pub fn test_config(authorize_endpoint: &str) -> FlowConfig {
    FlowConfig::new(
        "client-1",
        "https://app.example.com/callback",
        authorize_endpoint,
    )
    .with_scope("openid profile")
    .with_response_mode("pi.flow")
    .with_request_timeout(Duration::from_secs(5))
}

pub fn scripted_client(
    transport: &ScriptedTransport,
) -> DaVinciClient<ScriptedTransport, InMemoryFlowStorage> {
    DaVinciClient::with_parts(
        test_config("https://auth.example.com/as/authorize"),
        transport.clone(),
        InMemoryFlowStorage::new(),
    )
}

/// A continue payload carrying `fields` and optional prefilled form data.
pub fn form_payload(fields: Value, form_data: Value) -> Value {
    json!({
        "_links": {"next": {"href": NEXT_HREF}},
        "id": "node-1",
        "interactionId": "int-1",
        "interactionToken": "tok-1",
        "eventName": "continue",
        "form": {
            "name": "Sign On",
            "components": {"fields": fields}
        },
        "formData": {"value": form_data}
    })
}

pub fn login_payload() -> Value {
    form_payload(
        json!([
            {"type": "TEXT", "key": "username", "label": "Username", "required": true},
            {"type": "PASSWORD", "key": "password", "label": "Password"},
            {"type": "SUBMIT_BUTTON", "key": "SIGNON", "label": "Sign On"},
            {"type": "FLOW_LINK", "key": "register", "label": "Create account"}
        ]),
        json!({}),
    )
}

pub fn success_payload() -> Value {
    json!({
        "interactionId": "int-1",
        "session": {"id": "s1"},
        "authorizeResponse": {"code": "code-1", "state": "state-1"}
    })
}
