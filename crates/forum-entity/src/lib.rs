//! # forum-entity
//!
//! Domain entity models owned by the persistence layer. Database entities
//! derive `sqlx::FromRow`; enums map to PostgreSQL enum types.

pub mod account;
