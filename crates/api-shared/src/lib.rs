//! # API Shared
//!
//! Shared data and wire definitions for the intake backend.
//!
//! Contains:
//! - Record types persisted by the store (`BotRecord`, `CallLogEntry`)
//! - The `Patient` snapshot returned by the lookup endpoints
//! - Response bodies for the webhook and function endpoints
//! - Shared services like `HealthService`
//!
//! Used by `intake-core` and `api-rest`. Every type derives `utoipa::ToSchema` so the REST
//! crate can publish an OpenAPI document without redeclaring shapes.

pub mod health;
pub mod models;
pub mod timestamp;

pub use health::HealthService;
pub use models::*;
