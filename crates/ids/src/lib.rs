//! Prefixed timestamp identifiers.
//!
//! Every record the intake backend generates an identifier for uses the same shape: a short
//! kind prefix followed by the Unix epoch time in milliseconds at which the record was created.
//!
//! ## Canonical form
//! - `bot_<millis>` for bot configuration records
//! - `fc_<millis>` for in-call function trace entries
//! - `call_<millis>` for post-call webhook receipts
//!
//! Example: `call_1754388000123`
//!
//! ## Uniqueness
//! Two records created within the same millisecond would collide. [`PrefixedId::generate`]
//! takes a predicate describing which identifiers are already taken and bumps the millisecond
//! component until it finds a free one. Called inside the store's write lock this yields
//! identifiers that are unique within their collection and monotonic per generation.

mod prefixed;

pub use prefixed::{IdPrefix, PrefixedId};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type IdResult<T> = Result<T, IdError>;
