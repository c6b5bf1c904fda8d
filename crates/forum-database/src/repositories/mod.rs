//! Repository implementations.

pub mod account;
pub mod memory;

pub use account::{AccountRepository, PgAccountRepository};
pub use memory::MemoryAccountRepository;
