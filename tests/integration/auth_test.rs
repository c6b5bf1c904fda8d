//! Integration tests for login, current user, logout, and revocation.

use axum::http::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_login_then_current_user() {
    let app = TestApp::new();
    let account = app
        .create_local_account("alice", "alice@example.com", "password123")
        .await;

    let token = app.login("alice@example.com", "password123").await;

    let response = app.request("GET", "/api/auth/user", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["authenticated"], true);
    assert_eq!(response.body["user"]["id"], account.id);
    assert_eq!(response.body["user"]["username"], "alice");
    assert!(response.body["user"].get("password_hash").is_none());

    let refreshed = response.body["token"].as_str().unwrap();
    assert_ne!(refreshed, token);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials_uniformly() {
    let app = TestApp::new();
    app.create_local_account("alice", "alice@example.com", "password123")
        .await;

    let wrong_password = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "email": "alice@example.com", "password": "nope" })),
            None,
        )
        .await;
    let unknown_email = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "email": "bob@example.com", "password": "password123" })),
            None,
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body["message"], unknown_email.body["message"]);
}

#[tokio::test]
async fn test_login_validates_input() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "email": "not-an-email", "password": "" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_anonymous_current_user() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/auth/user", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["authenticated"], false);
    assert!(response.body.get("token").is_none());

    let garbage = app
        .request("GET", "/api/auth/user", None, Some("not.a.token"))
        .await;
    assert_eq!(garbage.status, StatusCode::OK);
    assert_eq!(garbage.body["authenticated"], false);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let app = TestApp::new();
    app.create_local_account("alice", "alice@example.com", "password123")
        .await;
    let token = app.login("alice@example.com", "password123").await;

    let response = app
        .request("POST", "/api/auth/logout", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"], "alice");
    assert!(response.body["timestamp"].is_i64());

    let after = app.request("GET", "/api/auth/user", None, Some(&token)).await;
    assert_eq!(after.body["authenticated"], false);

    let status = app
        .request("GET", "/api/auth/blacklist/status", None, None)
        .await;
    assert_eq!(status.status, StatusCode::OK);
    assert_eq!(status.body["blacklistSize"], 1);
}

#[tokio::test]
async fn test_logout_without_session_is_ok() {
    let app = TestApp::new();
    let response = app.request("POST", "/api/auth/logout", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.get("user").is_none());
}

#[tokio::test]
async fn test_logout_all_requires_authentication() {
    let app = TestApp::new();
    let response = app
        .request("POST", "/api/auth/logout/all", None, None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "User not authenticated");
}

#[tokio::test]
async fn test_logout_all_revokes_every_session() {
    let app = TestApp::new();
    app.create_local_account("alice", "alice@example.com", "password123")
        .await;
    app.create_local_account("bob", "bob@example.com", "hunter22")
        .await;

    let laptop = app.login("alice@example.com", "password123").await;
    let phone = app.login("alice@example.com", "password123").await;
    let bob = app.login("bob@example.com", "hunter22").await;

    let response = app
        .request("POST", "/api/auth/logout/all", None, Some(&laptop))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"], "alice");
    assert_eq!(response.body["revoked"], 2);

    for token in [&laptop, &phone] {
        let after = app.request("GET", "/api/auth/user", None, Some(token)).await;
        assert_eq!(after.body["authenticated"], false);
    }

    let other = app.request("GET", "/api/auth/user", None, Some(&bob)).await;
    assert_eq!(other.body["authenticated"], true);

    let fresh = app.login("alice@example.com", "password123").await;
    let after = app.request("GET", "/api/auth/user", None, Some(&fresh)).await;
    assert_eq!(after.body["authenticated"], true);
}

#[tokio::test]
async fn test_unreachable_store_leaves_requests_anonymous() {
    let app = TestApp::offline();
    app.create_local_account("alice", "alice@example.com", "password123")
        .await;

    let token = app.login("alice@example.com", "password123").await;

    let response = app.request("GET", "/api/auth/user", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["authenticated"], false);

    let logout = app
        .request("POST", "/api/auth/logout", None, Some(&token))
        .await;
    assert_eq!(logout.status, StatusCode::OK);

    let status = app
        .request("GET", "/api/auth/blacklist/status", None, None)
        .await;
    assert_eq!(status.status, StatusCode::SERVICE_UNAVAILABLE);
}
