//! # forum-database
//!
//! PostgreSQL connection management and the account repository consumed by
//! the authentication subsystem.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::account::{AccountRepository, PgAccountRepository};
