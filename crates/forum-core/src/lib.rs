//! # forum-core
//!
//! Core crate for the forum backend. Contains configuration schemas, the
//! shared TTL store capability trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other forum crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
