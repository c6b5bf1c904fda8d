//! Identity provider profiles and account linking.

pub mod github;
pub mod linker;
pub mod profile;

pub use github::{GithubClient, IdentityProviderClient};
pub use linker::{IdentityLinker, LinkError};
pub use profile::{GithubProfile, ProviderProfile};
