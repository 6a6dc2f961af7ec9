//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services, so
//! request handling never reads process-wide environment variables.

use crate::constants::{DEFAULT_DB_PATH, DEFAULT_FALLBACK_MEDICAL_ID, DEFAULT_PORT};
use crate::{IntakeError, IntakeResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    db_path: PathBuf,
    fallback_medical_id: Option<String>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `fallback_medical_id` is the identifier lookups use when the caller supplies none;
    /// `None` disables the fallback.
    pub fn new(db_path: PathBuf, fallback_medical_id: Option<String>) -> IntakeResult<Self> {
        if db_path.as_os_str().is_empty() {
            return Err(IntakeError::InvalidInput("db_path cannot be empty".into()));
        }
        if db_path.is_dir() {
            return Err(IntakeError::InvalidInput(format!(
                "db_path must be a file, found a directory: {}",
                db_path.display()
            )));
        }

        Ok(Self {
            db_path,
            fallback_medical_id,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn fallback_medical_id(&self) -> Option<&str> {
        self.fallback_medical_id.as_deref()
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            fallback_medical_id: Some(DEFAULT_FALLBACK_MEDICAL_ID.into()),
        }
    }
}

/// Resolve the backing file path from an optional environment value.
///
/// `None` or blank values select [`DEFAULT_DB_PATH`].
pub fn db_path_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
}

/// Parse the HTTP port from an optional environment value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_PORT`].
pub fn port_from_env_value(value: Option<String>) -> IntakeResult<u16> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(DEFAULT_PORT),
        Some(v) => v
            .parse::<u16>()
            .map_err(|e| IntakeError::InvalidInput(format!("invalid PORT '{}': {}", v, e))),
    }
}

/// Resolve the fallback medical id from an optional environment value.
///
/// An unset variable keeps [`DEFAULT_FALLBACK_MEDICAL_ID`]; a variable set to an empty value
/// disables the fallback.
pub fn fallback_medical_id_from_env_value(value: Option<String>) -> Option<String> {
    match value {
        None => Some(DEFAULT_FALLBACK_MEDICAL_ID.into()),
        Some(v) => {
            let trimmed = v.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_port_defaults_to_3000() {
        assert_eq!(port_from_env_value(None).unwrap(), 3000);
        assert_eq!(port_from_env_value(Some("  ".into())).unwrap(), 3000);
    }

    #[test]
    fn test_port_parses_value() {
        assert_eq!(port_from_env_value(Some("8080".into())).unwrap(), 8080);
    }

    #[test]
    fn test_port_rejects_garbage() {
        let err = port_from_env_value(Some("eighty".into())).expect_err("should fail");
        assert!(matches!(err, IntakeError::InvalidInput(_)));

        assert!(port_from_env_value(Some("70000".into())).is_err());
    }

    #[test]
    fn test_db_path_defaults() {
        assert_eq!(db_path_from_env_value(None), PathBuf::from("db.json"));
        assert_eq!(
            db_path_from_env_value(Some("/var/lib/intake/db.json".into())),
            PathBuf::from("/var/lib/intake/db.json")
        );
    }

    #[test]
    fn test_fallback_medical_id_resolution() {
        assert_eq!(
            fallback_medical_id_from_env_value(None).as_deref(),
            Some("MED1001")
        );
        assert_eq!(
            fallback_medical_id_from_env_value(Some("MED1002".into())).as_deref(),
            Some("MED1002")
        );
        assert_eq!(fallback_medical_id_from_env_value(Some("".into())), None);
    }

    #[test]
    fn test_config_rejects_directory_db_path() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let err = CoreConfig::new(temp_dir.path().to_path_buf(), None).expect_err("should fail");
        assert!(matches!(err, IntakeError::InvalidInput(_)));
    }

    #[test]
    fn test_config_accepts_missing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("db.json");
        let cfg = CoreConfig::new(path.clone(), Some("MED1001".into())).unwrap();
        assert_eq!(cfg.db_path(), path.as_path());
        assert_eq!(cfg.fallback_medical_id(), Some("MED1001"));
    }
}
