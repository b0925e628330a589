//! The public surface collaborators call: resumable reads, context digests,
//! and checkpoint maintenance.

pub mod config;
pub mod context;
pub mod error;
pub mod reader;

use std::path::Path;
use std::sync::atomic::AtomicBool;

use chrono::{Duration, Utc};
use tracing::debug;

use crate::checkpoint::{
    CheckpointBackend, CheckpointStore, JsonFileBackend, MemoryBackend, Progress, SweepOutcome,
};
use crate::document::{Chunk, SourceFile};
use crate::selection::{ChunkSelector, LexicalPriorityScorer, Scorer};
use crate::types::read_result::FileSummary;
pub use config::{ConfigError, IngestConfig};
pub use error::{IngestError, Result};

/// One per process; share it behind an `Arc`.
pub struct IngestEngine<S = LexicalPriorityScorer> {
    config: IngestConfig,
    store: CheckpointStore,
    selector: ChunkSelector<S>,
}

impl IngestEngine<LexicalPriorityScorer> {
    pub fn new(config: IngestConfig, backend: impl CheckpointBackend + 'static) -> Result<Self> {
        Self::with_scorer(config, backend, LexicalPriorityScorer)
    }

    /// Checkpoints persisted to `config.checkpoint_file`.
    pub fn open(config: IngestConfig) -> Result<Self> {
        let backend = JsonFileBackend::new(config.checkpoint_file.clone());
        Self::new(config, backend)
    }

    /// Checkpoints kept for the life of the process only.
    pub fn in_memory(config: IngestConfig) -> Result<Self> {
        Self::new(config, MemoryBackend::new())
    }
}

impl<S: Scorer> IngestEngine<S> {
    pub fn with_scorer(
        config: IngestConfig,
        backend: impl CheckpointBackend + 'static,
        scorer: S,
    ) -> Result<Self> {
        config.validate()?;
        let store = CheckpointStore::open(backend)?;

        Ok(Self {
            config,
            store,
            selector: ChunkSelector::new(scorer),
        })
    }

    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    /// Forget the file's checkpoint so the next read starts from chunk 0.
    pub fn reset(&self, path: &Path) -> Result<bool> {
        Ok(self.store.reset(path)?)
    }

    pub fn sweep(&self, max_age_days: u32) -> Result<usize> {
        Ok(self.store.sweep(Duration::days(i64::from(max_age_days)))?)
    }

    /// Sweep with the configured `checkpoint_max_age_days`.
    pub fn sweep_expired(&self) -> Result<usize> {
        self.sweep(self.config.checkpoint_max_age_days)
    }

    pub fn sweep_cancellable(&self, max_age_days: u32, cancel: &AtomicBool) -> Result<SweepOutcome> {
        let cutoff = Utc::now() - Duration::days(i64::from(max_age_days));
        Ok(self.store.sweep_cancellable(cutoff, cancel)?)
    }

    /// Size strictly above the large-file threshold. Unreadable files are
    /// reported as not large.
    pub fn is_large_file(&self, path: &Path) -> bool {
        match std::fs::metadata(path) {
            Ok(meta) => meta.len() > self.config.large_file_threshold_bytes,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "cannot stat file");
                false
            }
        }
    }

    pub fn reading_progress(&self, path: &Path) -> Result<Option<Progress>> {
        Ok(self.store.progress(path)?)
    }

    /// A chunk of a file with an active checkpoint, by position. Does not
    /// move the cursor.
    pub fn chunk_at(&self, path: &Path, index: usize) -> Result<Option<Chunk>> {
        Ok(self.store.chunk_at(path, index)?)
    }

    pub fn file_summary(&self, path: &Path) -> Result<FileSummary> {
        let meta = match std::fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(FileSummary {
                    path: path.display().to_string(),
                    exists: false,
                    size_bytes: 0,
                    lines: None,
                    is_large_file: false,
                    checkpoint_exists: false,
                    reading_progress: 0.0,
                });
            }
            Err(e) => return Err(IngestError::io(path, e)),
        };

        let is_large_file = meta.len() > self.config.large_file_threshold_bytes;
        let lines = if is_large_file {
            None
        } else {
            Some(SourceFile::load(path)?.content.lines().count())
        };
        let progress = self.store.progress(path)?;

        Ok(FileSummary {
            path: path.display().to_string(),
            exists: true,
            size_bytes: meta.len(),
            lines,
            is_large_file,
            checkpoint_exists: progress.is_some(),
            reading_progress: progress.map_or(0.0, |p| p.percent),
        })
    }
}
