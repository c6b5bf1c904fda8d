//! Account domain entities.

pub mod model;
pub mod provider;

pub use model::{Account, NewAccount};
pub use provider::AuthProvider;
