//! Post-login redirects to the front-end.

use reqwest::Url;

use forum_core::config::OAuthConfig;
use forum_core::error::AppError;
use forum_core::result::AppResult;

/// Scheme, host and port of an allowed redirect target.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Origin {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl Origin {
    fn of(url: &Url) -> Option<Self> {
        Some(Self {
            scheme: url.scheme().to_string(),
            host: url.host_str()?.to_ascii_lowercase(),
            port: url.port_or_known_default(),
        })
    }
}

/// Builds the front-end redirect carrying either a token or an error,
/// refusing targets outside the configured origin allow-list.
#[derive(Debug, Clone)]
pub struct RedirectPolicy {
    target: Url,
    allowed: Vec<Origin>,
}

impl RedirectPolicy {
    /// Creates a policy from OAuth configuration.
    ///
    /// Fails if the configured redirect URI is itself not on the allow-list.
    pub fn new(config: &OAuthConfig) -> AppResult<Self> {
        let allowed = config
            .authorized_redirect_origins
            .iter()
            .map(|origin| {
                Url::parse(origin)
                    .ok()
                    .and_then(|url| Origin::of(&url))
                    .ok_or_else(|| {
                        AppError::configuration(format!(
                            "Invalid entry in oauth.authorized_redirect_origins: '{origin}'"
                        ))
                    })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let target = Url::parse(&config.redirect_uri).map_err(|e| {
            AppError::configuration(format!("Invalid oauth.redirect_uri: {e}"))
        })?;

        let policy = Self { target, allowed };
        if !policy.is_authorized(&policy.target) {
            return Err(AppError::configuration(format!(
                "oauth.redirect_uri '{}' is not in oauth.authorized_redirect_origins",
                config.redirect_uri
            )));
        }
        Ok(policy)
    }

    /// Whether `url` shares scheme, host and port with an allowed origin.
    pub fn is_authorized(&self, url: &Url) -> bool {
        Origin::of(url).is_some_and(|origin| self.allowed.contains(&origin))
    }

    /// Whether the string `uri` is an allowed redirect target.
    #[cfg(test)]
    fn is_authorized_uri(&self, uri: &str) -> bool {
        Url::parse(uri).is_ok_and(|url| self.is_authorized(&url))
    }

    /// Redirect carrying a freshly issued token.
    pub fn with_token(&self, token: &str) -> String {
        self.with_param("token", token)
    }

    /// Redirect carrying a user-facing error message.
    pub fn with_error(&self, message: &str) -> String {
        self.with_param("error", message)
    }

    fn with_param(&self, name: &str, value: &str) -> String {
        let mut url = self.target.clone();
        url.query_pairs_mut().append_pair(name, value);
        url.into()
    }
}
