//! Claims carried by every session token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::principal::Principal;

/// JWT claims payload of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the account id in decimal.
    pub sub: String,
    /// Display name at the time of issuance.
    pub name: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Random token id; keeps tokens issued in the same second distinct.
    pub jti: Uuid,
}

impl Claims {
    /// Returns the account id from the subject claim.
    pub fn subject_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }

    /// Returns the issued-at instant.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    /// Returns the expiration instant.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Builds the request principal. `None` if the subject is not an account id.
    pub fn principal(&self) -> Option<Principal> {
        Some(Principal {
            id: self.subject_id()?,
            display_name: self.name.clone(),
        })
    }
}
