//! Identity provider enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where an account's identity is vouched for.
///
/// Fixed when the account is created; a later login through a different
/// provider is rejected rather than switching the account over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "auth_provider", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AuthProvider {
    /// Email + password held by the forum itself.
    Local,
    /// GitHub OAuth.
    Github,
}

impl AuthProvider {
    /// Return the provider as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "LOCAL",
            Self::Github => "GITHUB",
        }
    }

    /// Human-friendly name used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Github => "GitHub",
        }
    }

    /// Whether this provider is an external identity provider.
    pub fn is_external(&self) -> bool {
        !matches!(self, Self::Local)
    }
}

impl fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AuthProvider {
    type Err = forum_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "github" => Ok(Self::Github),
            _ => Err(forum_core::AppError::validation(format!(
                "Login with '{s}' is not supported"
            ))),
        }
    }
}
