//! Key builders for every entry the forum writes to the shared store.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses. The Redis provider prepends
//! its configured `key_prefix` on top of these.

/// Namespace for authentication entries.
const AUTH: &str = "auth";

// ── Revocation keys ────────────────────────────────────────

/// Key marking a single token as revoked. `token_hash` is the hex SHA-256
/// of the compact token.
pub fn revoked_token(token_hash: &str) -> String {
    format!("{AUTH}:revoked:{token_hash}")
}

/// Prefix shared by every revocation entry, for diagnostics counting.
pub fn revoked_prefix() -> String {
    format!("{AUTH}:revoked:")
}

/// Key of the set of tokens issued to or revoked for an account.
///
/// Keyed by account id; display names are not unique.
pub fn owner_tokens(account_id: i64) -> String {
    format!("{AUTH}:owner_tokens:{account_id}")
}

// ── OAuth keys ─────────────────────────────────────────────

/// Key holding a pending OAuth authorization `state` value.
pub fn oauth_state(state: &str) -> String {
    format!("{AUTH}:oauth_state:{state}")
}
