//! # forum-auth
//!
//! Authentication and session revocation for the forum backend.
//!
//! ## Modules
//!
//! - `token`: signed session token issuance and verification
//! - `revocation`: logout blacklist and per-owner token tracking in the shared store
//! - `gate`: per-request bearer token authentication
//! - `identity`: identity provider profiles, account linking, and the GitHub client
//! - `redirect`: allow-listed post-login redirects
//! - `password`: Argon2id hashing for local login

pub mod gate;
pub mod identity;
pub mod password;
pub mod principal;
pub mod redirect;
pub mod revocation;
pub mod token;

pub use gate::{AnonymousReason, AuthOutcome, AuthenticationGate};
pub use identity::{GithubClient, IdentityLinker, IdentityProviderClient, LinkError, ProviderProfile};
pub use password::PasswordHasher;
pub use principal::Principal;
pub use redirect::RedirectPolicy;
pub use revocation::RevocationStore;
pub use token::{Claims, IssuedToken, TokenCodec, TokenError};
