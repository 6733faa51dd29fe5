//! Integration tests for the session lifecycle against a mock account
//! service: acquisition at login, attachment on authenticated calls,
//! rotation through the refresh header, and invalidation on rejection.

use accterm::api::{ApiClient, ApiError};
use accterm::auth::SessionStore;
use accterm::models::ProfileUpdate;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn harness(server: &MockServer) -> (ApiClient, SessionStore, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let session = SessionStore::new(dir.path().to_path_buf());
    let api =
        ApiClient::new(server.uri(), session.clone()).expect("Failed to build API client");
    (api, session, dir)
}

fn profile_body() -> serde_json::Value {
    json!({
        "id": 1,
        "email": "a@b.com",
        "name": "Alice",
        "birth": "1990-01-02",
        "about": "hello",
        "createdTime": 1_700_000_000_000_i64,
        "updatedTime": 1_700_000_000_000_i64
    })
}

#[tokio::test]
async fn test_login_establishes_session_and_profile_attaches_token() {
    let server = MockServer::start().await;
    let (api, session, _dir) = harness(&server);

    Mock::given(method("POST"))
        .and(path("/account/login"))
        .and(body_json(json!({"email": "a@b.com", "password": "secret1"})))
        .respond_with(ResponseTemplate::new(200).insert_header("x-jwt", "TOK1"))
        .mount(&server)
        .await;

    api.login("a@b.com", "secret1").await.expect("login should succeed");
    assert_eq!(session.token(), Some("TOK1".to_string()));
    assert_eq!(session.email(), Some("a@b.com".to_string()));

    // The profile mock only matches the freshly issued token; an absent or
    // wrong Authorization header would fall through to a 404.
    Mock::given(method("GET"))
        .and(path("/account/profile"))
        .and(header("authorization", "Bearer TOK1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .mount(&server)
        .await;

    let account = api.fetch_profile().await.expect("profile fetch should succeed");
    assert_eq!(account.email, "a@b.com");
    assert_eq!(account.name, "Alice");
}

#[tokio::test]
async fn test_login_without_token_header_leaves_session_anonymous() {
    let server = MockServer::start().await;
    let (api, session, _dir) = harness(&server);

    Mock::given(method("POST"))
        .and(path("/account/login"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = api
        .login("a@b.com", "secret1")
        .await
        .expect_err("login without a token header must fail");
    assert!(matches!(err, ApiError::InvalidResponse(_)));
    assert_eq!(session.token(), None);
}

#[tokio::test]
async fn test_rejected_login_reports_error_and_no_session() {
    let server = MockServer::start().await;
    let (api, session, _dir) = harness(&server);

    Mock::given(method("POST"))
        .and(path("/account/login"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let err = api
        .login("a@b.com", "wrong")
        .await
        .expect_err("rejected login must fail");
    assert!(!err.is_network());
    assert_eq!(session.token(), None);
}

#[tokio::test]
async fn test_profile_401_clears_session() {
    let server = MockServer::start().await;
    let (api, session, _dir) = harness(&server);
    session.establish("TOK1", "a@b.com");

    Mock::given(method("GET"))
        .and(path("/account/profile"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = api
        .fetch_profile()
        .await
        .expect_err("rejected profile fetch must fail");
    assert!(matches!(err, ApiError::Unauthorized));
    // Server-confirmed rejection is the one path that logs the user out
    assert_eq!(session.token(), None);
}

#[tokio::test]
async fn test_edit_rotates_token_and_stale_token_is_never_resent() {
    let server = MockServer::start().await;
    let (api, session, _dir) = harness(&server);
    session.establish("TOK1", "a@b.com");

    let update = ProfileUpdate {
        name: "Alice".to_string(),
        birth: "1990-01-02".to_string(),
        about: "updated".to_string(),
    };

    Mock::given(method("PUT"))
        .and(path("/account/edit"))
        .and(header("authorization", "Bearer TOK1"))
        .and(body_json(json!({
            "name": "Alice",
            "birth": "1990-01-02",
            "about": "updated"
        })))
        .respond_with(ResponseTemplate::new(200).insert_header("x-jwt", "TOK2"))
        .mount(&server)
        .await;

    api.edit_profile(&update).await.expect("edit should succeed");
    assert_eq!(session.token(), Some("TOK2".to_string()));

    // Only the rotated token matches from here on; a request still carrying
    // TOK1 would miss this mock and fail the fetch.
    Mock::given(method("GET"))
        .and(path("/account/profile"))
        .and(header("authorization", "Bearer TOK2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .mount(&server)
        .await;

    api.fetch_profile()
        .await
        .expect("profile fetch with the rotated token should succeed");
}

#[tokio::test]
async fn test_edit_server_error_keeps_session_untouched() {
    let server = MockServer::start().await;
    let (api, session, _dir) = harness(&server);
    session.establish("TOK1", "a@b.com");

    Mock::given(method("PUT"))
        .and(path("/account/edit"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = api
        .edit_profile(&ProfileUpdate::default())
        .await
        .expect_err("edit against a failing server must fail");
    assert!(matches!(err, ApiError::ServerError(_)));
    assert_eq!(session.token(), Some("TOK1".to_string()));
}

#[tokio::test]
async fn test_network_failure_never_mutates_session() {
    // Take the server's address, then shut it down so every request is
    // refused at the socket.
    let dead_uri = {
        let server = MockServer::start().await;
        server.uri()
    };

    let dir = TempDir::new().expect("Failed to create temp dir");
    let session = SessionStore::new(dir.path().to_path_buf());
    let api = ApiClient::new(dead_uri, session.clone()).expect("Failed to build API client");

    // Anonymous stays anonymous
    let err = api
        .login("a@b.com", "secret1")
        .await
        .expect_err("login against a dead server must fail");
    assert!(err.is_network());
    assert_eq!(session.token(), None);

    // Authenticated stays authenticated
    session.establish("TOK1", "a@b.com");
    let err = api
        .fetch_profile()
        .await
        .expect_err("profile fetch against a dead server must fail");
    assert!(err.is_network());
    assert_eq!(session.token(), Some("TOK1".to_string()));
}

#[tokio::test]
async fn test_signup_roundtrip() {
    let server = MockServer::start().await;
    let (api, session, _dir) = harness(&server);

    Mock::given(method("POST"))
        .and(path("/account/signup"))
        .and(body_json(json!({
            "email": "new@b.com",
            "password": "secret1!",
            "confirmPassword": "secret1!"
        })))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    api.signup("new@b.com", "secret1!", "secret1!")
        .await
        .expect("signup should succeed");
    // Signup issues no token; the user signs in afterwards
    assert_eq!(session.token(), None);
}

#[tokio::test]
async fn test_duplicate_signup_is_rejected() {
    let server = MockServer::start().await;
    let (api, _session, _dir) = harness(&server);

    Mock::given(method("POST"))
        .and(path("/account/signup"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let err = api
        .signup("dup@b.com", "secret1!", "secret1!")
        .await
        .expect_err("duplicate signup must fail");
    assert!(!err.is_network());
}

#[tokio::test]
async fn test_session_survives_restart() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");

    {
        let session = SessionStore::new(dir.path().to_path_buf());
        let api =
            ApiClient::new(server.uri(), session.clone()).expect("Failed to build API client");

        Mock::given(method("POST"))
            .and(path("/account/login"))
            .respond_with(ResponseTemplate::new(200).insert_header("x-jwt", "TOK1"))
            .mount(&server)
            .await;

        api.login("a@b.com", "secret1").await.expect("login should succeed");
    }

    // A fresh process finds the persisted token and attaches it
    let session = SessionStore::new(dir.path().to_path_buf());
    assert!(session.load().expect("Failed to load session"));
    let api = ApiClient::new(server.uri(), session.clone()).expect("Failed to build API client");

    Mock::given(method("GET"))
        .and(path("/account/profile"))
        .and(header("authorization", "Bearer TOK1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .mount(&server)
        .await;

    api.fetch_profile()
        .await
        .expect("profile fetch with the persisted token should succeed");
}
