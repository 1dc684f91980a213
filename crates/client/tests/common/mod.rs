#![allow(dead_code)]

use serde_json::{json, Value};
use signdesk_client::config::ClientConfig;
use signdesk_client::Backend;
use signdesk_core::session::{AuthTokens, SessionContext};
use wiremock::MockServer;

pub const ACCESS_TOKEN: &str = "test-access-token";
pub const REFRESH_TOKEN: &str = "test-refresh-token";
pub const CLIENT_ID: &str = "signdesk-mobile";

pub fn tokens() -> AuthTokens {
    AuthTokens {
        access_token: ACCESS_TOKEN.to_string(),
        refresh_token: Some(REFRESH_TOKEN.to_string()),
        id_token: None,
        expires_at: None,
    }
}

/// A session that is already signed in.
pub fn logged_in() -> SessionContext {
    let session = SessionContext::new();
    session.login(tokens(), None);
    session
}

/// Every backend pointed at the mock server.
pub fn backend(server: &MockServer, session: SessionContext) -> Backend {
    let config = ClientConfig::single_host(&server.uri(), CLIENT_ID);
    Backend::new(&config, session).unwrap()
}

pub fn bearer() -> String {
    format!("Bearer {ACCESS_TOKEN}")
}

/// Wrap `content` in the standard response envelope.
pub fn envelope(content: Value) -> Value {
    json!({
        "message": "ok",
        "status": 200,
        "timestamp": "2024-05-01T12:00:00Z",
        "content": content
    })
}

pub fn page(content: Value, page_number: u32, total_records: u64) -> Value {
    json!({
        "content": content,
        "pageNumber": page_number,
        "pageSize": 20,
        "totalRecords": total_records,
        "totalPages": 1,
        "hasPreviousPage": false,
        "hasNextPage": false
    })
}
