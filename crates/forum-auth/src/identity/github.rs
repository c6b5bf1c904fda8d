//! GitHub OAuth client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url, header};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use forum_core::config::oauth::GithubOAuthConfig;
use forum_core::error::{AppError, ErrorKind};
use forum_core::result::AppResult;
use forum_entity::account::AuthProvider;

use super::profile::{GithubProfile, ProviderProfile};

/// User agent GitHub requires on API calls.
const USER_AGENT: &str = "forum-backend";

/// Talks to an identity provider's OAuth endpoints.
#[async_trait]
pub trait IdentityProviderClient: Send + Sync + std::fmt::Debug + 'static {
    /// The provider this client speaks to.
    fn provider(&self) -> AuthProvider;

    /// URL to send the browser to, carrying the anti-forgery `state`.
    fn authorize_url(&self, state: &str) -> AppResult<String>;

    /// Exchanges an authorization code and fetches the user's profile.
    async fn fetch_profile(&self, code: &str) -> AppResult<ProviderProfile>;
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubEmail {
    email: String,
    primary: bool,
    verified: bool,
}

/// GitHub implementation of [`IdentityProviderClient`].
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: Client,
    config: GithubOAuthConfig,
}

impl GithubClient {
    /// Creates a client from GitHub OAuth configuration.
    pub fn new(config: GithubOAuthConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Failed to build HTTP client", e)
            })?;
        Ok(Self { http, config })
    }

    fn map_err(context: &str, e: reqwest::Error) -> AppError {
        AppError::with_source(ErrorKind::ExternalService, format!("{context}: {e}"), e)
    }

    async fn exchange_code(&self, code: &str) -> AppResult<String> {
        let response: TokenResponse = self
            .http
            .post(&self.config.token_url)
            .header(header::ACCEPT, "application/json")
            .json(&TokenRequest {
                client_id: &self.config.client_id,
                client_secret: &self.config.client_secret,
                code,
                redirect_uri: &self.config.callback_url,
            })
            .send()
            .await
            .map_err(|e| Self::map_err("GitHub token exchange failed", e))?
            .error_for_status()
            .map_err(|e| Self::map_err("GitHub token exchange rejected", e))?
            .json()
            .await
            .map_err(|e| Self::map_err("Unreadable GitHub token response", e))?;

        match response.access_token {
            Some(token) => Ok(token),
            None => Err(AppError::external_service(format!(
                "GitHub did not issue an access token: {}",
                response
                    .error_description
                    .or(response.error)
                    .unwrap_or_else(|| "unknown error".to_string())
            ))),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        access_token: &str,
    ) -> AppResult<T> {
        let url = format!("{}{path}", self.config.api_base_url.trim_end_matches('/'));
        self.http
            .get(&url)
            .bearer_auth(access_token)
            .header(header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| Self::map_err("GitHub API request failed", e))?
            .error_for_status()
            .map_err(|e| Self::map_err("GitHub API request rejected", e))?
            .json()
            .await
            .map_err(|e| Self::map_err("Unreadable GitHub API response", e))
    }

    /// Primary verified address, else any verified one.
    async fn fetch_verified_email(&self, access_token: &str) -> AppResult<Option<String>> {
        let emails: Vec<GithubEmail> = self.get_json("/user/emails", access_token).await?;
        Ok(pick_email(emails))
    }
}

fn pick_email(emails: Vec<GithubEmail>) -> Option<String> {
    let mut fallback = None;
    for email in emails.into_iter().filter(|e| e.verified) {
        if email.primary {
            return Some(email.email);
        }
        fallback.get_or_insert(email.email);
    }
    fallback
}

#[async_trait]
impl IdentityProviderClient for GithubClient {
    fn provider(&self) -> AuthProvider {
        AuthProvider::Github
    }

    fn authorize_url(&self, state: &str) -> AppResult<String> {
        let scope = self.config.scopes.join(" ");
        let url = Url::parse_with_params(
            &self.config.authorize_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("scope", scope.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| {
            AppError::configuration(format!("Invalid oauth.github.authorize_url: {e}"))
        })?;
        Ok(url.into())
    }

    async fn fetch_profile(&self, code: &str) -> AppResult<ProviderProfile> {
        let access_token = self.exchange_code(code).await?;
        let mut profile: GithubProfile = self.get_json("/user", &access_token).await?;
        debug!(github_id = profile.id, login = %profile.login, "Fetched GitHub profile");

        if profile.email.as_deref().is_none_or(str::is_empty) {
            match self.fetch_verified_email(&access_token).await {
                Ok(email) => profile.email = email,
                Err(e) => warn!(error = %e, "Could not fetch GitHub email addresses"),
            }
        }

        Ok(ProviderProfile::Github(profile))
    }
}
