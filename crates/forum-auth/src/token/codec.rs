//! HS256 session token creation and verification.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use forum_core::config::AuthConfig;
use forum_core::error::AppError;
use forum_core::result::AppResult;

use super::claims::Claims;

/// Why a presented token was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Not a structurally valid token for this server.
    #[error("token is malformed")]
    Malformed,
    /// The signature does not match the claims.
    #[error("token signature does not match")]
    Tampered,
    /// The token is past its expiry instant.
    #[error("token has expired")]
    Expired,
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::authentication(err.to_string())
    }
}

/// A freshly signed token together with its claims.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWT serialization.
    pub token: String,
    /// The signed claims.
    pub claims: Claims,
}

/// Creates and verifies signed session tokens.
#[derive(Clone)]
pub struct TokenCodec {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
    /// Token lifetime.
    lifetime: TimeDelta,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Creates a codec from auth configuration.
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        let lifetime = TimeDelta::from_std(config.token_lifetime()).map_err(|_| {
            AppError::configuration("auth.token_lifetime_hours is out of range")
        })?;
        Ok(Self::with_lifetime(config.jwt_secret.as_bytes(), lifetime))
    }

    /// Creates a codec with an explicit secret and lifetime.
    pub fn with_lifetime(secret: &[u8], lifetime: TimeDelta) -> Self {
        // Expiry is checked against the caller's clock in `verify_at`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime,
        }
    }

    /// Configured token lifetime.
    pub fn lifetime(&self) -> TimeDelta {
        self.lifetime
    }

    /// Issues a token for the given account, valid from now.
    pub fn issue(&self, subject_id: i64, display_name: &str) -> AppResult<IssuedToken> {
        self.issue_at(subject_id, display_name, Utc::now())
    }

    /// Issues a token as if the current instant were `now`.
    pub fn issue_at(
        &self,
        subject_id: i64,
        display_name: &str,
        now: DateTime<Utc>,
    ) -> AppResult<IssuedToken> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: subject_id.to_string(),
            name: display_name.to_string(),
            iat,
            exp: iat + self.lifetime.num_seconds(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode session token: {e}")))?;

        Ok(IssuedToken { token, claims })
    }

    /// Verifies a token against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies signature, structure, and expiry as of `now`.
    ///
    /// A token is still valid at exactly its expiry instant.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                JwtErrorKind::InvalidSignature => TokenError::Tampered,
                JwtErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        let claims = data.claims;
        if claims.subject_id().is_none() {
            return Err(TokenError::Malformed);
        }
        let expires_at = claims.expires_at().ok_or(TokenError::Malformed)?;
        if now > expires_at {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// Reads the expiry instant without checking the signature.
    ///
    /// Only for sizing revocation TTLs; never for trust decisions.
    pub fn expiry_of(token: &str) -> Result<DateTime<Utc>, TokenError> {
        #[derive(Deserialize)]
        struct ExpiryOnly {
            exp: i64,
        }

        let mut segments = token.split('.');
        let (Some(_), Some(payload), Some(_), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::Malformed);
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claims: ExpiryOnly =
            serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)?;
        DateTime::from_timestamp(claims.exp, 0).ok_or(TokenError::Malformed)
    }
}
