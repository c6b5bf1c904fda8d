//! In-memory shared store provider.

pub mod store;

pub use store::MemoryCacheProvider;
