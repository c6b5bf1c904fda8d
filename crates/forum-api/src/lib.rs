//! # forum-api
//!
//! HTTP API layer for the forum backend built on Axum.
//!
//! Provides the authentication endpoints, the request context and bearer
//! authentication middleware, extractors, DTOs, and error mapping.

pub mod app;
pub mod context;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use context::RequestContext;
pub use error::ApiError;
pub use state::AppState;
