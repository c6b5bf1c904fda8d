//! Shared test helpers for integration tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use forum_api::{AppState, build_app};
use forum_auth::identity::GithubProfile;
use forum_auth::{IdentityProviderClient, PasswordHasher, ProviderProfile};
use forum_cache::CacheManager;
use forum_cache::memory::MemoryCacheProvider;
use forum_core::config::AppConfig;
use forum_core::config::cache::MemoryCacheConfig;
use forum_core::error::AppError;
use forum_core::result::AppResult;
use forum_core::traits::CacheProvider;
use forum_database::repositories::{AccountRepository, MemoryAccountRepository};
use forum_entity::account::{Account, AuthProvider, NewAccount};

/// Code the fake provider answers with a profile lacking an email.
pub const CODE_WITHOUT_EMAIL: &str = "no-email";

/// Identity provider that serves canned profiles keyed by authorization code.
#[derive(Debug, Default)]
pub struct FakeGithub {
    profiles: HashMap<String, ProviderProfile>,
}

impl FakeGithub {
    /// Registers the profile returned for `code`.
    pub fn with_profile(mut self, code: &str, id: u64, login: &str, email: Option<&str>) -> Self {
        self.profiles.insert(
            code.to_string(),
            ProviderProfile::Github(GithubProfile {
                id,
                login: login.to_string(),
                name: None,
                email: email.map(str::to_string),
                avatar_url: Some(format!("https://avatars.test/{id}")),
            }),
        );
        self
    }
}

#[async_trait]
impl IdentityProviderClient for FakeGithub {
    fn provider(&self) -> AuthProvider {
        AuthProvider::Github
    }

    fn authorize_url(&self, state: &str) -> AppResult<String> {
        Ok(format!("https://github.test/login/oauth/authorize?state={state}"))
    }

    async fn fetch_profile(&self, code: &str) -> AppResult<ProviderProfile> {
        self.profiles
            .get(code)
            .cloned()
            .ok_or_else(|| AppError::external_service("bad_verification_code"))
    }
}

/// Store whose every operation fails.
#[derive(Debug)]
pub struct OfflineCache;

#[async_trait]
impl CacheProvider for OfflineCache {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Err(AppError::cache("store offline"))
    }
    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
        Err(AppError::cache("store offline"))
    }
    async fn set_nx(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<bool> {
        Err(AppError::cache("store offline"))
    }
    async fn delete(&self, _key: &str) -> AppResult<()> {
        Err(AppError::cache("store offline"))
    }
    async fn exists(&self, _key: &str) -> AppResult<bool> {
        Err(AppError::cache("store offline"))
    }
    async fn expire(&self, _key: &str, _ttl: Duration) -> AppResult<bool> {
        Err(AppError::cache("store offline"))
    }
    async fn set_add(&self, _key: &str, _member: &str, _ttl: Duration) -> AppResult<()> {
        Err(AppError::cache("store offline"))
    }
    async fn set_members(&self, _key: &str) -> AppResult<Vec<String>> {
        Err(AppError::cache("store offline"))
    }
    async fn keys_matching(&self, _prefix: &str) -> AppResult<Vec<String>> {
        Err(AppError::cache("store offline"))
    }
    async fn health_check(&self) -> AppResult<bool> {
        Err(AppError::cache("store offline"))
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Account store behind the router
    pub accounts: Arc<MemoryAccountRepository>,
}

impl TestApp {
    /// Application backed by the in-memory store and a provider with no profiles.
    pub fn new() -> Self {
        Self::build(memory_cache(), FakeGithub::default())
    }

    /// Application whose provider answers the given profiles.
    pub fn with_provider(provider: FakeGithub) -> Self {
        Self::build(memory_cache(), provider)
    }

    /// Application whose shared store is unreachable.
    pub fn offline() -> Self {
        Self::build(
            CacheManager::from_provider(Arc::new(OfflineCache)),
            FakeGithub::default(),
        )
    }

    fn build(cache: CacheManager, provider: FakeGithub) -> Self {
        let config = AppConfig::default();
        let cors = config.server.cors.clone();
        let accounts = Arc::new(MemoryAccountRepository::new());
        let state = AppState::new(config, cache, accounts.clone(), Arc::new(provider))
            .expect("Failed to build app state");
        Self {
            router: build_app(state, &cors),
            accounts,
        }
    }

    /// Registers a LOCAL account with the given password.
    pub async fn create_local_account(&self, username: &str, email: &str, password: &str) -> Account {
        let hash = PasswordHasher::new()
            .hash_password(password)
            .expect("Failed to hash password");
        self.accounts
            .insert(&NewAccount {
                username: username.to_string(),
                email: email.to_string(),
                password_hash: Some(hash),
                avatar_url: None,
                provider: AuthProvider::Local,
                provider_id: None,
                github_id: None,
            })
            .await
            .expect("Failed to insert account")
    }

    /// Logs in and returns the bearer token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({ "email": email, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
        response.body["token"]
            .as_str()
            .expect("login response has no token")
            .to_string()
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            body,
            location,
        }
    }
}

/// Parsed test response
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
    /// `Location` header, for redirects
    pub location: Option<String>,
}

impl TestResponse {
    /// Value of query parameter `name` in the redirect target.
    pub fn location_param(&self, name: &str) -> Option<String> {
        let location = self.location.as_deref()?;
        let url = reqwest::Url::parse(location).ok()?;
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

fn memory_cache() -> CacheManager {
    CacheManager::from_provider(Arc::new(MemoryCacheProvider::new(
        &MemoryCacheConfig::default(),
    )))
}
