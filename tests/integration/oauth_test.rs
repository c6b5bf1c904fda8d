//! Integration tests for identity provider login.

use axum::http::StatusCode;

use forum_database::repositories::AccountRepository;
use forum_entity::account::AuthProvider;

use crate::helpers::{CODE_WITHOUT_EMAIL, FakeGithub, TestApp, TestResponse};

async fn start_login(app: &TestApp) -> String {
    let response = app
        .request("GET", "/api/auth/oauth2/authorize/github", None, None)
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    let location = response.location.as_deref().unwrap();
    assert!(location.starts_with("https://github.test/login/oauth/authorize"));
    response.location_param("state").unwrap()
}

async fn callback(app: &TestApp, code: &str, state: &str) -> TestResponse {
    let response = app
        .request(
            "GET",
            &format!("/api/auth/oauth2/callback/github?code={code}&state={state}"),
            None,
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert!(
        response
            .location
            .as_deref()
            .unwrap()
            .starts_with("http://localhost:3000/oauth2/redirect?")
    );
    response
}

#[tokio::test]
async fn test_first_provider_login_registers_account() {
    let app = TestApp::with_provider(FakeGithub::default().with_profile(
        "good",
        9001,
        "octocat",
        Some("octo@example.com"),
    ));

    let state = start_login(&app).await;
    let response = callback(&app, "good", &state).await;

    let token = response.location_param("token").expect("no token in redirect");
    assert!(response.location_param("error").is_none());

    let account = app
        .accounts
        .find_by_email("octo@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.provider, AuthProvider::Github);
    assert_eq!(account.provider_id.as_deref(), Some("9001"));
    assert!(account.password_hash.is_none());

    let me = app.request("GET", "/api/auth/user", None, Some(&token)).await;
    assert_eq!(me.body["authenticated"], true);
    assert_eq!(me.body["user"]["username"], "octocat");
}

#[tokio::test]
async fn test_provider_login_for_local_email_is_refused() {
    let app = TestApp::with_provider(FakeGithub::default().with_profile(
        "clash",
        7,
        "alice-gh",
        Some("alice@example.com"),
    ));
    let local = app
        .create_local_account("alice", "alice@example.com", "password123")
        .await;

    let state = start_login(&app).await;
    let response = callback(&app, "clash", &state).await;

    assert!(response.location_param("token").is_none());
    let error = response.location_param("error").unwrap();
    assert!(error.contains("signed up with local account"), "{error}");

    let unchanged = app.accounts.find_by_id(local.id).await.unwrap().unwrap();
    assert_eq!(unchanged.provider, AuthProvider::Local);
    assert_eq!(unchanged.username, "alice");
    assert!(unchanged.provider_id.is_none());
}

#[tokio::test]
async fn test_provider_without_email_is_refused() {
    let app = TestApp::with_provider(FakeGithub::default().with_profile(
        CODE_WITHOUT_EMAIL,
        8,
        "ghost",
        None,
    ));

    let state = start_login(&app).await;
    let response = callback(&app, CODE_WITHOUT_EMAIL, &state).await;

    assert_eq!(
        response.location_param("error").as_deref(),
        Some("Email not found from OAuth2 provider")
    );
    assert!(app.accounts.is_empty().await);
}

#[tokio::test]
async fn test_state_is_single_use() {
    let app = TestApp::with_provider(FakeGithub::default().with_profile(
        "good",
        9001,
        "octocat",
        Some("octo@example.com"),
    ));

    let state = start_login(&app).await;
    let first = callback(&app, "good", &state).await;
    assert!(first.location_param("token").is_some());

    let replay = callback(&app, "good", &state).await;
    assert!(replay.location_param("token").is_none());
    assert!(replay.location_param("error").is_some());
}

#[tokio::test]
async fn test_unknown_state_is_refused() {
    let app = TestApp::new();
    let response = callback(&app, "anything", "forged").await;
    assert_eq!(
        response.location_param("error").as_deref(),
        Some("Invalid or expired OAuth state")
    );
}

#[tokio::test]
async fn test_provider_error_is_forwarded() {
    let app = TestApp::new();
    let response = app
        .request(
            "GET",
            "/api/auth/oauth2/callback/github?error=access_denied&error_description=User%20said%20no",
            None,
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location_param("error").as_deref(), Some("User said no"));
}

#[tokio::test]
async fn test_unsupported_provider() {
    let app = TestApp::new();
    let response = app
        .request("GET", "/api/auth/oauth2/authorize/google", None, None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["message"],
        "Sorry! Login with google is not supported yet."
    );
}

#[tokio::test]
async fn test_logout_all_leaves_namesake_account_alone() {
    let app = TestApp::with_provider(FakeGithub::default().with_profile(
        "namesake",
        31337,
        "alice",
        Some("mallory@evil.test"),
    ));
    app.create_local_account("alice", "alice@example.com", "password123")
        .await;
    let victim = app.login("alice@example.com", "password123").await;

    let state = start_login(&app).await;
    let response = callback(&app, "namesake", &state).await;
    let namesake = response.location_param("token").unwrap();

    let me = app.request("GET", "/api/auth/user", None, Some(&namesake)).await;
    assert_eq!(me.body["user"]["username"], "alice");
    assert_eq!(me.body["user"]["email"], "mallory@evil.test");
    let refreshed = me.body["token"].as_str().unwrap().to_string();

    let logout_all = app
        .request("POST", "/api/auth/logout/all", None, Some(&namesake))
        .await;
    assert_eq!(logout_all.status, StatusCode::OK);
    assert_eq!(logout_all.body["revoked"], 2);

    for token in [&namesake, &refreshed] {
        let after = app.request("GET", "/api/auth/user", None, Some(token)).await;
        assert_eq!(after.body["authenticated"], false);
    }

    let still_in = app.request("GET", "/api/auth/user", None, Some(&victim)).await;
    assert_eq!(still_in.body["authenticated"], true);
    assert_eq!(still_in.body["user"]["email"], "alice@example.com");
}
