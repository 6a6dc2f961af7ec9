//! The record store.
//!
//! All persistent state lives in one JSON document holding two ordered collections, `bots`
//! and `callLogs`. The document is loaded in full for every operation and written back in full
//! after every mutation.
//!
//! ## Read-modify-write
//!
//! Mutations go through [`RecordStore::transaction`], which takes the store's write lock,
//! loads the document, applies the caller's closure and saves the result. A closure that
//! returns an error aborts the transaction and nothing is written.
//!
//! The lock only covers writers inside this process. Several processes sharing one backing
//! file can still lose updates.
//!
//! ## Recovery
//!
//! A missing or unreadable document is never an error for readers: [`RecordStore::load`]
//! falls back to the empty document. Write failures are propagated.

mod backend;

pub use backend::{DocumentBackend, JsonFileBackend, MemoryBackend};

use crate::IntakeResult;
use api_shared::{BotRecord, CallLogEntry};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// The persisted document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub bots: Vec<BotRecord>,
    #[serde(default, rename = "callLogs")]
    pub call_logs: Vec<CallLogEntry>,
}

/// Single-writer store over an injected [`DocumentBackend`].
#[derive(Debug)]
pub struct RecordStore {
    backend: Box<dyn DocumentBackend>,
    write_lock: Mutex<()>,
}

impl RecordStore {
    pub fn new(backend: impl DocumentBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            write_lock: Mutex::new(()),
        }
    }

    /// Store backed by a JSON file at `path`. The file is created on first save.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(JsonFileBackend::new(path))
    }

    /// Store that keeps its document in memory only.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Load the full document, recovering to the empty document on any failure.
    pub fn load(&self) -> StoreDocument {
        match self.backend.read() {
            Ok(Some(doc)) => doc,
            Ok(None) => StoreDocument::default(),
            Err(e) => {
                tracing::warn!("store unreadable, treating as empty: {}", e);
                StoreDocument::default()
            }
        }
    }

    /// Replace the persisted document with `doc`.
    ///
    /// # Errors
    ///
    /// Returns an `IntakeError` if serialisation or the write itself fails. There is no retry.
    pub fn save(&self, doc: &StoreDocument) -> IntakeResult<()> {
        self.backend.write(doc)?;
        tracing::debug!(
            bots = doc.bots.len(),
            call_logs = doc.call_logs.len(),
            "store saved"
        );
        Ok(())
    }

    /// Run one read-modify-write unit under the write lock.
    ///
    /// The document is saved only when `f` returns `Ok`.
    pub fn transaction<R>(
        &self,
        f: impl FnOnce(&mut StoreDocument) -> IntakeResult<R>,
    ) -> IntakeResult<R> {
        // The guarded data is `()`, so a poisoned lock carries no broken state.
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut doc = self.load();
        let result = f(&mut doc)?;
        self.save(&doc)?;
        Ok(result)
    }
}
