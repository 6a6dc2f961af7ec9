//! Constants used throughout the intake core crate.

/// Default backing file for the record store, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "db.json";

/// Default HTTP port when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 3000;

/// Identifier used by lookups that arrive without one.
///
/// This is the first sample patient, kept so the demo agent always has context to work with.
pub const DEFAULT_FALLBACK_MEDICAL_ID: &str = "MED1001";

/// Name recorded in function traces for the in-call patient lookup.
pub const GET_PATIENT_FUNCTION: &str = "getPatient";

/// Error message returned when an update targets a missing bot.
pub const BOT_NOT_FOUND_MESSAGE: &str = "Bot not found";
