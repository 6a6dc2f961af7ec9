//! # Intake Core
//!
//! Core business logic for the intake agent backend.
//!
//! This crate contains pure data operations and file management:
//! - The record store: one JSON document holding `bots` and `callLogs`
//! - Bot configuration CRUD and the append-only call log
//! - Patient lookup behind a pluggable directory
//! - The pre-call, in-call and post-call webhook contract
//!
//! **No API concerns**: HTTP routing, status codes and OpenAPI belong in `api-rest`.

pub mod config;
pub mod constants;
pub mod error;
pub mod patient;
pub mod repositories;
pub mod store;
pub mod webhooks;

pub use config::CoreConfig;
pub use constants::*;
pub use error::{IntakeError, IntakeResult};
pub use patient::{PatientDirectory, SampleDirectory};
pub use repositories::bots::BotService;
pub use repositories::call_logs::CallLogService;
pub use store::{RecordStore, StoreDocument};
pub use webhooks::WebhookService;
