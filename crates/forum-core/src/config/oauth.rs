//! Identity provider and post-login redirect configuration.

use serde::{Deserialize, Serialize};

/// Third-party login settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Front-end page that receives `?token=` or `?error=` after provider login.
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Origins (`scheme://host[:port]`) a login redirect may target.
    #[serde(default = "default_authorized_origins")]
    pub authorized_redirect_origins: Vec<String>,
    /// Lifetime of the anti-CSRF `state` value handed to the provider.
    #[serde(default = "default_state_ttl")]
    pub state_ttl_seconds: u64,
    /// GitHub OAuth application.
    #[serde(default)]
    pub github: GithubOAuthConfig,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            redirect_uri: default_redirect_uri(),
            authorized_redirect_origins: default_authorized_origins(),
            state_ttl_seconds: default_state_ttl(),
            github: GithubOAuthConfig::default(),
        }
    }
}

/// GitHub OAuth application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubOAuthConfig {
    /// OAuth client id.
    #[serde(default)]
    pub client_id: String,
    /// OAuth client secret.
    #[serde(default)]
    pub client_secret: String,
    /// Authorization page URL.
    #[serde(default = "default_github_authorize_url")]
    pub authorize_url: String,
    /// Code exchange endpoint.
    #[serde(default = "default_github_token_url")]
    pub token_url: String,
    /// REST API base URL.
    #[serde(default = "default_github_api_url")]
    pub api_base_url: String,
    /// Callback URL registered with GitHub.
    #[serde(default = "default_github_callback_url")]
    pub callback_url: String,
    /// Requested scopes.
    #[serde(default = "default_github_scopes")]
    pub scopes: Vec<String>,
}

impl Default for GithubOAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            authorize_url: default_github_authorize_url(),
            token_url: default_github_token_url(),
            api_base_url: default_github_api_url(),
            callback_url: default_github_callback_url(),
            scopes: default_github_scopes(),
        }
    }
}

fn default_redirect_uri() -> String {
    "http://localhost:3000/oauth2/redirect".to_string()
}

fn default_authorized_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_state_ttl() -> u64 {
    600
}

fn default_github_authorize_url() -> String {
    "https://github.com/login/oauth/authorize".to_string()
}

fn default_github_token_url() -> String {
    "https://github.com/login/oauth/access_token".to_string()
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_github_callback_url() -> String {
    "http://localhost:8080/api/auth/oauth2/callback/github".to_string()
}

fn default_github_scopes() -> Vec<String> {
    vec!["read:user".to_string(), "user:email".to_string()]
}
