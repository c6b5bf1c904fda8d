//! Logout blacklist and per-owner token tracking.

pub mod store;

pub use store::RevocationStore;
