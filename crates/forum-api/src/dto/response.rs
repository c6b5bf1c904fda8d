//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use forum_auth::Principal;
use forum_entity::account::Account;

/// Success envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Always true for this envelope
    pub success: bool,
    /// Payload
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wraps a payload.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Public view of an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    /// Account id
    pub id: i64,
    /// Display name
    pub username: String,
    /// Email address
    pub email: String,
    /// Avatar URL
    pub avatar: Option<String>,
    /// Profile text
    pub bio: Option<String>,
    /// Registration time
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            avatar: account.avatar_url,
            bio: account.bio,
            created_at: account.created_at,
        }
    }
}

/// Who the caller is, with a refreshed token when authenticated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    /// Whether a valid session was presented
    pub authenticated: bool,
    /// Account details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AccountResponse>,
    /// Freshly issued token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl CurrentUserResponse {
    /// Response for a caller without a usable session.
    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            user: None,
            token: None,
        }
    }
}

/// Single-session logout result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    /// Human-readable result
    pub message: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    /// Who was logged out
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// "Log out everywhere" result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutAllResponse {
    /// Human-readable result
    pub message: String,
    /// Who was logged out
    pub user: String,
    /// Number of tracked tokens revoked
    pub revoked: usize,
    /// Epoch milliseconds
    pub timestamp: i64,
}

/// Blacklist size report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistStatusResponse {
    /// Number of live revocation entries
    #[serde(rename = "blacklistSize")]
    pub blacklist_size: usize,
    /// Epoch milliseconds
    pub timestamp: i64,
}

/// Local login result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token
    pub token: String,
    /// Token expiry
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
    /// Logged-in principal
    pub user: Principal,
}

/// Liveness report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`
    pub status: String,
    /// Crate version
    pub version: String,
    /// Shared store reachability
    pub cache: bool,
}
