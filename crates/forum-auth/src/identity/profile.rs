//! Identity provider profiles.

use serde::{Deserialize, Serialize};

use forum_entity::account::AuthProvider;

use super::linker::LinkError;

/// Public profile returned by GitHub's `GET /user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubProfile {
    /// Numeric GitHub user id.
    pub id: u64,
    /// Login handle.
    pub login: String,
    /// Display name, when the user set one.
    #[serde(default)]
    pub name: Option<String>,
    /// Public email, when the user exposes one.
    #[serde(default)]
    pub email: Option<String>,
    /// Avatar image URL.
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A profile from one of the supported identity providers.
///
/// Supporting a new provider means one more variant and one more arm in
/// each accessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderProfile {
    /// GitHub OAuth profile.
    Github(GithubProfile),
}

impl ProviderProfile {
    /// Builds a profile from a provider registration id and raw user attributes.
    pub fn from_attributes(
        registration_id: &str,
        attributes: serde_json::Value,
    ) -> Result<Self, LinkError> {
        match registration_id.parse::<AuthProvider>() {
            Ok(AuthProvider::Github) => serde_json::from_value(attributes)
                .map(Self::Github)
                .map_err(|e| {
                    LinkError::Store(forum_core::AppError::external_service(format!(
                        "Unexpected GitHub profile shape: {e}"
                    )))
                }),
            _ => Err(LinkError::UnsupportedProvider(registration_id.to_string())),
        }
    }

    /// The provider this profile came from.
    pub fn provider(&self) -> AuthProvider {
        match self {
            Self::Github(_) => AuthProvider::Github,
        }
    }

    /// The account's identifier at the provider.
    pub fn id(&self) -> String {
        match self {
            Self::Github(p) => p.id.to_string(),
        }
    }

    /// Name to show in the forum.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Github(p) => p
                .name
                .as_deref()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(&p.login),
        }
    }

    /// Email address, if the provider disclosed one.
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Github(p) => p.email.as_deref().filter(|email| !email.is_empty()),
        }
    }

    /// Avatar image URL.
    pub fn avatar_url(&self) -> Option<&str> {
        match self {
            Self::Github(p) => p.avatar_url.as_deref(),
        }
    }

    /// Replaces the email, used when it was fetched separately.
    pub fn with_email(self, email: Option<String>) -> Self {
        match self {
            Self::Github(p) => Self::Github(GithubProfile { email, ..p }),
        }
    }
}
