//! Core traits defined in `forum-core` and implemented by other crates.

pub mod cache;

pub use cache::CacheProvider;
