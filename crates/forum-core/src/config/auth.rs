//! Session token and revocation configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Placeholder secret shipped in the default configuration.
pub const DEFAULT_JWT_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Token signing, lifetime, and revocation-store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for token signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Fixed lifetime of every issued session token, in hours.
    #[serde(default = "default_token_lifetime")]
    pub token_lifetime_hours: u64,
    /// Extra seconds added to every revocation TTL to absorb store clock skew.
    #[serde(default = "default_revocation_skew")]
    pub revocation_skew_seconds: u64,
    /// Upper bound for a single revocation-store call made by the request gate.
    #[serde(default = "default_store_timeout")]
    pub store_timeout_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_lifetime_hours: default_token_lifetime(),
            revocation_skew_seconds: default_revocation_skew(),
            store_timeout_ms: default_store_timeout(),
        }
    }
}

impl AuthConfig {
    /// Lifetime of every issued token.
    pub fn token_lifetime(&self) -> Duration {
        Duration::from_secs(self.token_lifetime_hours * 3600)
    }

    /// Margin added to revocation TTLs.
    pub fn revocation_skew(&self) -> Duration {
        Duration::from_secs(self.revocation_skew_seconds)
    }

    /// Timeout for a single store call on the request path.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Whether the signing secret is still the shipped placeholder.
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

fn default_jwt_secret() -> String {
    DEFAULT_JWT_SECRET.to_string()
}

fn default_token_lifetime() -> u64 {
    24
}

fn default_revocation_skew() -> u64 {
    5
}

fn default_store_timeout() -> u64 {
    250
}
