//! Storage media for the record store.

use super::StoreDocument;
use crate::{IntakeError, IntakeResult};
use std::fmt::Debug;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tempfile::NamedTempFile;

/// Where a [`StoreDocument`] lives between requests.
///
/// Implementations read and write the whole document. Locking is the store's job.
pub trait DocumentBackend: Debug + Send + Sync {
    /// Read the document. `Ok(None)` means nothing has been stored yet.
    fn read(&self) -> IntakeResult<Option<StoreDocument>>;

    /// Replace the stored document.
    fn write(&self, doc: &StoreDocument) -> IntakeResult<()>;
}

/// Pretty-printed JSON file, replaced atomically on every write.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl DocumentBackend for JsonFileBackend {
    fn read(&self) -> IntakeResult<Option<StoreDocument>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(IntakeError::FileRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| IntakeError::Deserialization {
                path: self.path.clone(),
                source,
            })
    }

    fn write(&self, doc: &StoreDocument) -> IntakeResult<()> {
        let json = serde_json::to_string_pretty(doc).map_err(IntakeError::Serialization)?;

        let parent = self.parent_dir();
        fs::create_dir_all(parent).map_err(IntakeError::StoreDirCreation)?;

        // Readers only ever see the old file or the new one.
        let mut temp = NamedTempFile::new_in(parent).map_err(IntakeError::FileWrite)?;
        temp.write_all(json.as_bytes())
            .map_err(IntakeError::FileWrite)?;
        temp.flush().map_err(IntakeError::FileWrite)?;
        temp.persist(&self.path)
            .map_err(|e| IntakeError::FilePersist {
                path: self.path.clone(),
                source: e.error,
            })?;

        Ok(())
    }
}

/// Document held in memory as serialised JSON.
///
/// Keeping the serialised form means every read goes through the same parsing (and recovery)
/// path as the file backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    contents: Mutex<Option<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-loaded with raw document text, which need not be valid.
    pub fn with_contents(raw: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(raw.into())),
        }
    }

    /// Current raw document text, if anything has been stored.
    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DocumentBackend for MemoryBackend {
    fn read(&self) -> IntakeResult<Option<StoreDocument>> {
        let guard = self.contents.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_deref() {
            None => Ok(None),
            Some(raw) => serde_json::from_str(raw).map(Some).map_err(|source| {
                IntakeError::Deserialization {
                    path: PathBuf::from(":memory:"),
                    source,
                }
            }),
        }
    }

    fn write(&self, doc: &StoreDocument) -> IntakeResult<()> {
        let json = serde_json::to_string_pretty(doc).map_err(IntakeError::Serialization)?;
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = Some(json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_backend_missing_file_reads_none() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let backend = JsonFileBackend::new(temp_dir.path().join("db.json"));

        assert!(backend.read().expect("read should succeed").is_none());
    }

    #[test]
    fn test_file_backend_malformed_is_deserialization_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("db.json");
        fs::write(&path, "[]").expect("Failed to write file");

        let err = JsonFileBackend::new(&path).read().expect_err("should fail");
        assert!(matches!(err, IntakeError::Deserialization { .. }));
    }

    #[test]
    fn test_file_backend_write_leaves_no_temp_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let backend = JsonFileBackend::new(temp_dir.path().join("db.json"));

        backend
            .write(&StoreDocument::default())
            .expect("write should succeed");
        backend
            .write(&StoreDocument::default())
            .expect("write should succeed");

        let entries: Vec<_> = fs::read_dir(temp_dir.path())
            .expect("Failed to read dir")
            .flatten()
            .map(|e| e.file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("db.json")]);
    }

    #[test]
    fn test_relative_path_without_parent_uses_cwd() {
        let backend = JsonFileBackend::new("db.json");
        assert_eq!(backend.parent_dir(), Path::new("."));
    }

    #[test]
    fn test_memory_backend_stores_pretty_json() {
        let backend = MemoryBackend::new();
        assert!(backend.read().unwrap().is_none());

        backend.write(&StoreDocument::default()).unwrap();
        assert_eq!(
            backend.contents().as_deref(),
            Some("{\n  \"bots\": [],\n  \"callLogs\": []\n}")
        );
        assert_eq!(backend.read().unwrap(), Some(StoreDocument::default()));
    }
}
