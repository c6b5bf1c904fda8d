//! Account entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::provider::AuthProvider;

/// The durable local identity behind every login.
///
/// `email` is unique across all accounts; `(provider, provider_id)` is
/// unique for external providers. Both are enforced by the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Account {
    /// Unique account identifier.
    pub id: i64,
    /// Display name shown next to posts.
    pub username: String,
    /// Email address, the cross-provider join key.
    pub email: String,
    /// Argon2 password hash; absent for provider-created accounts.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
    /// Free-form profile text.
    pub bio: Option<String>,
    /// Identity provider that created this account.
    pub provider: AuthProvider,
    /// Identifier of the account at its provider.
    pub provider_id: Option<String>,
    /// GitHub user id, kept in its own column for GitHub-bound accounts.
    pub github_id: Option<String>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Whether the account can log in with a password.
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Data required to create a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    /// Display name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Pre-hashed password (local accounts only).
    pub password_hash: Option<String>,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
    /// Identity provider.
    pub provider: AuthProvider,
    /// Identifier at the provider.
    pub provider_id: Option<String>,
    /// GitHub user id.
    pub github_id: Option<String>,
}
