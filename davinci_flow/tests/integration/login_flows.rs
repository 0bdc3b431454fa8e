use davinci_flow::{
    CollectorType, ErrorCode, ErrorStatus, ErrorType, FlowError, Node, NodeStatus, ResponseStatus,
    TransportResponse,
};
use serde_json::json;

use crate::common::{
    NEXT_HREF, ScriptedTransport, form_payload, login_payload, scripted_client, success_payload,
};

#[tokio::test]
async fn test_username_password_login_succeeds() {
    // Given a server that asks for credentials and then accepts them
    let transport = ScriptedTransport::new()
        .ok(login_payload())
        .ok(success_payload());
    let mut client = scripted_client(&transport);

    // When the user fills the form and submits
    client.start(&[]).await.unwrap();
    client.update("username-0", Some(json!("ada"))).unwrap();
    client.update("password-1", Some(json!("secret"))).unwrap();
    let node = client.next().await.unwrap();

    // Then the flow ends in success with the session and authorization code
    let Node::Success(success) = node else {
        panic!("Expected success, got {:?}", node.status());
    };
    assert_eq!(success.server.session.as_deref(), Some("s1"));
    assert_eq!(
        success.authorization.as_ref().and_then(|a| a.code.as_deref()),
        Some("code-1")
    );

    // And the submit carried the working values and the default action
    let body = transport.last_body().unwrap();
    assert_eq!(body["parameters"]["data"]["actionKey"], json!("SIGNON"));
    assert_eq!(
        body["parameters"]["data"]["formData"],
        json!({"username": "ada", "password": "secret"})
    );
    assert_eq!(body["interactionId"], json!("int-1"));
}

#[tokio::test]
async fn test_text_field_starts_empty() {
    let transport = ScriptedTransport::new().ok(json!({
        "_links": {"next": {"href": NEXT_HREF}},
        "form": {"components": {"fields": [{"type": "TEXT", "key": "u", "label": "Username"}]}},
        "formData": {"value": {}}
    }));
    let mut client = scripted_client(&transport);

    client.start(&[]).await.unwrap();

    assert_eq!(client.node().status(), NodeStatus::Continue);
    assert_eq!(client.collectors().len(), 1);
    assert_eq!(
        client.collectors()[0].collector_type(),
        CollectorType::TextCollector
    );
    let output = serde_json::to_value(&client.collectors()[0]).unwrap();
    assert_eq!(output["output"]["value"], json!(""));
}

#[tokio::test]
async fn test_recoverable_error_then_retry() {
    // Given a server that rejects the first attempt with field errors
    let transport = ScriptedTransport::new()
        .ok(login_payload())
        .http_error(
            400,
            json!({
                "code": "validationError",
                "message": "Invalid credentials",
                "httpResponseCode": 400,
                "details": [{"rawResponse": {"code": "INVALID_DATA", "details": [
                    {"code": "INVALID_VALUE", "message": "Wrong password", "target": "password"}
                ]}}]
            }),
        )
        .ok(success_payload());
    let mut client = scripted_client(&transport);

    client.start(&[]).await.unwrap();
    client.update("username-0", Some(json!("ada"))).unwrap();
    client.update("password-1", Some(json!("wrong"))).unwrap();

    // When the first submit fails
    client.next().await.unwrap();

    // Then the node is an error that keeps the form and the user's input
    assert_eq!(client.node().status(), NodeStatus::Error);
    let error = client.error().unwrap();
    assert_eq!(error.status, ErrorStatus::Error);
    assert_eq!(error.message, "Invalid credentials");
    assert_eq!(error.collectors[0].target, "password");
    assert_eq!(client.collectors()[0].input_value(), Some(json!("ada")));

    // When the user corrects the password and resubmits to the same link
    client.update("password-1", Some(json!("secret"))).unwrap();
    client.next().await.unwrap();

    // Then the flow succeeds
    assert_eq!(client.node().status(), NodeStatus::Success);
    let requests = transport.requests();
    assert_eq!(requests[2].url, NEXT_HREF);
    assert_eq!(
        requests[2].body.as_ref().unwrap()["parameters"]["data"]["formData"]["password"],
        json!("secret")
    );
}

#[tokio::test]
async fn test_server_error_is_failure() {
    let transport = ScriptedTransport::new()
        .ok(login_payload())
        .http_error(500, json!({"message": "Internal"}));
    let mut client = scripted_client(&transport);
    client.start(&[]).await.unwrap();

    client.next().await.unwrap();

    let Node::Failure(failure) = client.node() else {
        panic!("Expected failure");
    };
    assert_eq!(failure.error.code, ErrorCode::Text("unknown".to_string()));
    assert_eq!(failure.http_status, Some(500));
    assert!(client.collectors().is_empty());

    // A failed flow cannot continue until it is restarted
    assert!(matches!(client.next().await, Err(FlowError::InvalidState(_))));
}

#[tokio::test]
async fn test_unrecoverable_code_is_failure() {
    let transport = ScriptedTransport::new()
        .ok(login_payload())
        .http_error(
            400,
            json!({"code": 1999, "message": "Unauthorized!", "httpResponseCode": 401}),
        );
    let mut client = scripted_client(&transport);
    client.start(&[]).await.unwrap();

    client.next().await.unwrap();

    let error = client.error().unwrap();
    assert_eq!(client.node().status(), NodeStatus::Failure);
    assert_eq!(error.code, ErrorCode::Number(1999));
    assert_eq!(error.internal_http_status, Some(401));
    assert_eq!(error.message, "Unauthorized!");
}

#[tokio::test]
async fn test_connector_terminal_state_is_failure() {
    let transport = ScriptedTransport::new().ok(login_payload()).http_error(
        400,
        json!({
            "code": "requestFailed",
            "connectorId": "pingOneAuthenticationConnector",
            "capabilityName": "setSession"
        }),
    );
    let mut client = scripted_client(&transport);
    client.start(&[]).await.unwrap();

    client.next().await.unwrap();

    assert_eq!(client.node().status(), NodeStatus::Failure);
}

#[tokio::test]
async fn test_network_error_is_failure() {
    // The scripted transport answers like a dropped connection once exhausted
    let transport = ScriptedTransport::new().ok(login_payload());
    let mut client = scripted_client(&transport);
    client.start(&[]).await.unwrap();

    client.next().await.unwrap();

    let Node::Failure(failure) = client.node() else {
        panic!("Expected failure");
    };
    assert_eq!(failure.error.error_type, ErrorType::NetworkError);
    assert_eq!(failure.http_status, None);
}

#[tokio::test]
async fn test_flow_link_sends_action_request() {
    let register_form = form_payload(
        json!([{"type": "TEXT", "key": "email", "label": "Email"}]),
        json!({"email": "ada@example.com"}),
    );
    let transport = ScriptedTransport::new()
        .ok(login_payload())
        .ok(register_form);
    let mut client = scripted_client(&transport);
    client.start(&[]).await.unwrap();

    client.flow("register").await.unwrap();

    let body = transport.last_body().unwrap();
    assert_eq!(body["parameters"]["eventType"], json!("action"));
    assert_eq!(body["parameters"]["data"], json!({"actionKey": "register"}));
    assert_eq!(
        client.collectors()[0].input_value(),
        Some(json!("ada@example.com"))
    );
}

#[tokio::test]
async fn test_cached_responses_and_subscription() {
    let transport = ScriptedTransport::new()
        .ok(login_payload())
        .push(TransportResponse::Error {
            status: ResponseStatus::Http(503),
            data: json!({"message": "down"}),
        });
    let mut client = scripted_client(&transport);
    let mut receiver = client.subscribe();

    client.start(&[]).await.unwrap();
    let first_key = client.node().cache_key().unwrap().to_string();
    assert_eq!(receiver.borrow_and_update().status(), NodeStatus::Continue);

    client.next().await.unwrap();
    let second_key = client.node().cache_key().unwrap().to_string();

    assert_ne!(first_key, second_key);
    assert_eq!(client.cached_response(&first_key), Some(&login_payload()));
    assert_eq!(
        client.cached_response(&second_key),
        Some(&json!({"message": "down"}))
    );
    assert_eq!(receiver.borrow_and_update().status(), NodeStatus::Failure);
}

#[tokio::test]
async fn test_validation_before_submit() {
    let transport = ScriptedTransport::new().ok(login_payload());
    let mut client = scripted_client(&transport);
    client.start(&[]).await.unwrap();

    assert_eq!(
        client.validate("username-0").unwrap(),
        vec!["Value cannot be empty".to_string()]
    );

    client.update("username-0", Some(json!("ada"))).unwrap();

    assert!(client.validate("username-0").unwrap().is_empty());
}
