use davinci_flow::{DaVinciClient, NodeStatus};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::test_config;

#[tokio::test]
async fn test_login_over_http() {
    // Given an authorization server that serves one form and then a session
    let server = MockServer::start().await;
    let next_href = format!("{}/flow/next", server.uri());

    Mock::given(method("GET"))
        .and(path("/as/authorize"))
        .and(query_param("response_mode", "pi.flow"))
        .and(query_param("client_id", "client-1"))
        .and(query_param("code_challenge_method", "S256"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_links": {"next": {"href": next_href}},
            "interactionId": "int-1",
            "interactionToken": "tok-1",
            "eventName": "continue",
            "form": {"components": {"fields": [
                {"type": "TEXT", "key": "username", "label": "Username"},
                {"type": "SUBMIT_BUTTON", "key": "SIGNON", "label": "Sign On"}
            ]}},
            "formData": {"value": {}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/flow/next"))
        .and(header("interactiontoken", "tok-1"))
        .and(body_partial_json(json!({
            "interactionId": "int-1",
            "parameters": {"eventType": "submit", "data": {"formData": {"username": "ada"}}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"session": {"id": "s1"}})))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&format!("{}/as/authorize", server.uri()));
    let mut client = DaVinciClient::new(config).unwrap();

    // When running the flow against it
    client.start(&[]).await.unwrap();
    client.update("username-0", Some(json!("ada"))).unwrap();
    client.next().await.unwrap();

    // Then the flow succeeds with the server session
    assert_eq!(client.node().status(), NodeStatus::Success);
}

#[tokio::test]
async fn test_http_timeout_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(std::time::Duration::from_secs(3))
                .set_body_json(json!({})),
        )
        .mount(&server)
        .await;

    let config = test_config(&format!("{}/as/authorize", server.uri()))
        .with_request_timeout(std::time::Duration::from_millis(200));
    let mut client = DaVinciClient::new(config).unwrap();

    client.start(&[]).await.unwrap();

    assert_eq!(client.node().status(), NodeStatus::Failure);
    assert_eq!(client.error().unwrap().code.to_string(), "FETCH_ERROR");
}
