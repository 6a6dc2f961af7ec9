//! Services over the two collections held by the record store.

pub mod bots;
pub mod call_logs;
