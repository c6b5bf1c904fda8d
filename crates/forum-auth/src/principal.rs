//! The authenticated caller of a request.

use serde::{Deserialize, Serialize};

/// Identity established from a verified, unrevoked session token.
///
/// Derived per request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Account id.
    pub id: i64,
    /// Display name; also the owner key for bulk revocation.
    pub display_name: String,
}
