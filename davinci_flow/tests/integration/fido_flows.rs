use davinci_flow::{Fido, FidoErrorCode, NodeStatus, collector_options};
use serde_json::json;

use crate::common::{
    MockWebAuthn, ScriptedTransport, form_payload, scripted_client, success_payload,
};

fn registration_payload() -> serde_json::Value {
    form_payload(
        json!([{
            "type": "FIDO2",
            "key": "fido2",
            "label": "Register a passkey",
            "action": "REGISTER",
            "trigger": "BUTTON",
            "publicKeyCredentialCreationOptions": {
                "challenge": [-1, 2, -3],
                "rp": {"id": "auth.example.com", "name": "Example"},
                "user": {"id": [7, -7], "name": "ada", "displayName": "Ada"},
                "pubKeyCredParams": [{"type": "public-key", "alg": "-7"}],
                "attestation": "none"
            }
        }]),
        json!({}),
    )
}

fn authentication_payload() -> serde_json::Value {
    form_payload(
        json!([{
            "type": "FIDO2",
            "key": "fido2",
            "label": "Use your passkey",
            "action": "AUTHENTICATE",
            "publicKeyCredentialRequestOptions": {
                "challenge": [5, -5],
                "rpId": "auth.example.com",
                "userVerification": "preferred"
            }
        }]),
        json!({}),
    )
}

#[tokio::test]
async fn test_passkey_registration_is_submitted() {
    // Given a node asking for a passkey registration
    let transport = ScriptedTransport::new()
        .ok(registration_payload())
        .ok(success_payload());
    let mut client = scripted_client(&transport);
    client.start(&[]).await.unwrap();
    let fido = Fido::new(MockWebAuthn::accepting());

    // When the authenticator creates a credential and it is put on the collector
    let options = collector_options(&client.collectors()[0]).unwrap().clone();
    let value = fido.register(&options).await.unwrap();
    client
        .update("fido2-0", Some(serde_json::to_value(&value).unwrap()))
        .unwrap();
    client.next().await.unwrap();

    // Then the attestation travels base64-encoded in the form data
    let body = transport.last_body().unwrap();
    let attestation = &body["parameters"]["data"]["formData"]["fido2"]["attestationValue"];
    assert_eq!(attestation["id"], json!("credential-1"));
    assert_eq!(attestation["rawId"], json!("3q0="));
    // Challenge bytes -1, 2, -3 arrive as ff 02 fd
    assert_eq!(attestation["response"]["clientDataJSON"], json!("/wL9"));
    assert_eq!(client.node().status(), NodeStatus::Success);
}

#[tokio::test]
async fn test_passkey_authentication_value() {
    let transport = ScriptedTransport::new().ok(authentication_payload());
    let mut client = scripted_client(&transport);
    client.start(&[]).await.unwrap();
    let fido = Fido::new(MockWebAuthn::accepting());

    let options = collector_options(&client.collectors()[0]).unwrap().clone();
    let value = fido.authenticate(&options).await.unwrap();

    assert_eq!(value.assertion_value.response.client_data_json, "Bfs=");
    assert_eq!(value.assertion_value.response.user_handle.as_deref(), Some("Aw=="));
}

#[tokio::test]
async fn test_passkey_registration_cancelled() {
    // Given an authenticator where the user dismisses the prompt
    let transport = ScriptedTransport::new().ok(registration_payload());
    let mut client = scripted_client(&transport);
    client.start(&[]).await.unwrap();
    let fido = Fido::new(MockWebAuthn::rejecting("NotAllowedError", "x"));

    // When registering
    let options = collector_options(&client.collectors()[0]).unwrap().clone();
    let error = fido.register(&options).await.unwrap_err();

    // Then a typed fido error comes back and the node is untouched
    assert_eq!(error.code, FidoErrorCode::NotAllowedError);
    assert_eq!(
        serde_json::to_value(&error).unwrap(),
        json!({"code": "NotAllowedError", "message": "x", "type": "fido_error"})
    );
    assert_eq!(client.node().status(), NodeStatus::Continue);
    assert_eq!(transport.requests().len(), 1);
}
