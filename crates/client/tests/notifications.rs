mod common;

use assert_matches::assert_matches;
use serde_json::json;
use signdesk_client::error::ApiError;
use signdesk_client::response::PageRequest;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{backend, logged_in, page};

#[tokio::test]
async fn searches_one_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notifications/search"))
        .and(query_param("pageNumber", "1"))
        .and(query_param("pageSize", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([
                {"id": "n-1", "title": "Sign now", "read": false},
                {"id": "n-2", "message": "Done", "read": true}
            ]),
            1,
            2,
        )))
        .mount(&server)
        .await;

    let backend = backend(&server, logged_in());
    let result = backend
        .notifications
        .search(PageRequest::default())
        .await
        .unwrap();
    assert_eq!(result.total_records, 2);
    assert!(!result.content[0].read);
    assert!(result.content[1].read);
}

#[tokio::test]
async fn marks_and_deletes() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/notifications/n-1/mark-as-read"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/notifications/mark-all-as-read"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/notifications/n-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend(&server, logged_in());
    backend.notifications.mark_as_read("n-1").await.unwrap();
    backend.notifications.mark_all_as_read().await.unwrap();
    backend.notifications.delete("n-1").await.unwrap();
}

#[tokio::test]
async fn ids_with_reserved_characters_stay_in_one_segment() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/notifications/a%2Fb%3Fx"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend(&server, logged_in());
    backend.notifications.delete("a/b?x").await.unwrap();
}

#[tokio::test]
async fn expired_token_is_unauthenticated() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/notifications/mark-all-as-read"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let backend = backend(&server, logged_in());
    let result = backend.notifications.mark_all_as_read().await;
    assert_matches!(result, Err(ApiError::Unauthenticated));
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notifications/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let backend = backend(&server, logged_in());
    let result = backend.notifications.search(PageRequest::default()).await;
    assert_matches!(result, Err(ApiError::Decode(_)));
}
