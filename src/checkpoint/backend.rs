use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::checkpoint::{Checkpoint, CheckpointStoreError};
use crate::types::identifiers::TrackedPath;

/// Every persisted checkpoint, keyed by path. BTreeMap keeps the file sorted.
pub type CheckpointSet = BTreeMap<TrackedPath, Checkpoint>;

/// Durable storage for the checkpoint set.
///
/// `save` receives the complete set and must not return before it is durable.
pub trait CheckpointBackend: Send + Sync {
    fn load(&self) -> Result<CheckpointSet, CheckpointStoreError>;
    fn save(&self, records: &CheckpointSet) -> Result<(), CheckpointStoreError>;
}

/// One pretty-printed JSON document: `{ "<path>": { ...checkpoint } }`.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CheckpointBackend for JsonFileBackend {
    fn load(&self) -> Result<CheckpointSet, CheckpointStoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no checkpoint file, starting empty");
                return Ok(CheckpointSet::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut records: CheckpointSet = match serde_json::from_slice(&bytes) {
            Ok(records) => records,
            Err(e) => {
                // Hand-edited into an unreadable state; the next save rewrites it.
                warn!(path = %self.path.display(), error = %e, "ignoring malformed checkpoint file");
                return Ok(CheckpointSet::new());
            }
        };

        // The map key is authoritative.
        for (key, record) in records.iter_mut() {
            if &record.path != key {
                record.path = key.clone();
            }
        }

        Ok(records)
    }

    fn save(&self, records: &CheckpointSet) -> Result<(), CheckpointStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        let f = fs::File::create(&tmp)?;
        serde_json::to_writer_pretty(&f, records)?;
        f.sync_all()?;

        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Process-local backend, for tests and callers that do not need resumption
/// across restarts.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: Mutex<CheckpointSet>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: CheckpointSet) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// Copy of what was last saved.
    pub fn snapshot(&self) -> Result<CheckpointSet, CheckpointStoreError> {
        self.records
            .lock()
            .map(|records| records.clone())
            .map_err(|_| CheckpointStoreError::LockPoisoned)
    }
}

impl CheckpointBackend for MemoryBackend {
    fn load(&self) -> Result<CheckpointSet, CheckpointStoreError> {
        self.snapshot()
    }

    fn save(&self, records: &CheckpointSet) -> Result<(), CheckpointStoreError> {
        let mut stored = self
            .records
            .lock()
            .map_err(|_| CheckpointStoreError::LockPoisoned)?;
        *stored = records.clone();
        Ok(())
    }
}

impl<B: CheckpointBackend + ?Sized> CheckpointBackend for std::sync::Arc<B> {
    fn load(&self) -> Result<CheckpointSet, CheckpointStoreError> {
        (**self).load()
    }

    fn save(&self, records: &CheckpointSet) -> Result<(), CheckpointStoreError> {
        (**self).save(records)
    }
}
