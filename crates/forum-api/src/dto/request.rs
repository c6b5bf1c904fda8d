//! Request DTOs with validation.

use serde::Deserialize;
use validator::Validate;

/// Local email/password login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Account email
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Plaintext password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Query parameters the identity provider appends to the callback URL.
#[derive(Debug, Default, Deserialize)]
pub struct OAuthCallbackQuery {
    /// Authorization code
    pub code: Option<String>,
    /// Anti-forgery state issued by the authorize endpoint
    pub state: Option<String>,
    /// Provider-side error code (e.g. `access_denied`)
    pub error: Option<String>,
    /// Provider-side error detail
    pub error_description: Option<String>,
}
