mod common;

use assert_matches::assert_matches;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::json;
use signdesk_client::auth::AuthError;
use signdesk_core::session::SessionContext;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{backend, logged_in, REFRESH_TOKEN};

fn id_token() -> String {
    let claims = json!({"sub": "u-42", "name": "Ana Souza", "email": "ana@example.com"});
    format!(
        "e30.{}.signature",
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap())
    )
}

fn token_body(access: &str) -> serde_json::Value {
    json!({
        "access_token": access,
        "refresh_token": "new-refresh",
        "id_token": id_token(),
        "expires_in": 300,
        "token_type": "Bearer"
    })
}

#[tokio::test]
async fn exchange_code_starts_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/protocol/openid-connect/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=abc123"))
        .and(body_string_contains("client_id=signdesk-mobile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh")))
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionContext::new();
    let backend = backend(&server, session.clone());

    let tokens = backend.auth.exchange_code("abc123").await.unwrap();
    assert_eq!(tokens.access_token, "fresh");
    assert!(tokens.expires_at.is_some());

    assert!(session.is_authenticated());
    assert_eq!(session.access_token().unwrap(), "fresh");
    let profile = session.profile().unwrap();
    assert_eq!(profile.id, "u-42");
    assert_eq!(profile.name, "Ana Souza");
}

#[tokio::test]
async fn repeated_code_is_not_exchanged_twice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/protocol/openid-connect/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh")))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend(&server, SessionContext::new());

    backend.auth.exchange_code("dup").await.unwrap();
    let second = backend.auth.exchange_code("dup").await;
    assert_matches!(second, Err(AuthError::DuplicateCode));
}

#[tokio::test]
async fn expired_code_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/protocol/openid-connect/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Code expired"
        })))
        .mount(&server)
        .await;

    let session = SessionContext::new();
    let backend = backend(&server, session.clone());

    let result = backend.auth.exchange_code("late").await;
    assert_matches!(result, Err(AuthError::ExpiredCode));
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn rejected_code_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/protocol/openid-connect/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Code not valid"
        })))
        .mount(&server)
        .await;

    let backend = backend(&server, SessionContext::new());
    let result = backend.auth.exchange_code("bogus").await;
    assert_matches!(result, Err(AuthError::InvalidCode));
}

#[tokio::test]
async fn refresh_replaces_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/protocol/openid-connect/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains(format!("refresh_token={REFRESH_TOKEN}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("rotated")))
        .expect(1)
        .mount(&server)
        .await;

    let session = logged_in();
    let backend = backend(&server, session.clone());

    backend.auth.refresh().await.unwrap();
    assert_eq!(session.access_token().unwrap(), "rotated");
    assert_eq!(session.refresh_token().as_deref(), Some("new-refresh"));
}

#[tokio::test]
async fn refresh_without_session_fails_locally() {
    let server = MockServer::start().await;
    let backend = backend(&server, SessionContext::new());
    assert_matches!(backend.auth.refresh().await, Err(AuthError::SessionExpired));
}

#[tokio::test]
async fn logout_ends_provider_session_and_clears_local_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/protocol/openid-connect/logout"))
        .and(body_string_contains(format!("refresh_token={REFRESH_TOKEN}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let session = logged_in();
    let backend = backend(&server, session.clone());

    backend.auth.logout().await.unwrap();
    assert!(!session.is_authenticated());
}
