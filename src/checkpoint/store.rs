use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::{check_checkpoint, ChunkCache, Invalidation};
use crate::checkpoint::backend::{CheckpointBackend, CheckpointSet, MemoryBackend};
use crate::checkpoint::record::{Checkpoint, Progress};
use crate::document::{fingerprint, split, Chunk, SourceFile, SourceFileError};
use crate::types::identifiers::{TrackedPath, TrackedPathError};

#[derive(Debug, Error)]
pub enum CheckpointStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Checkpoint store lock poisoned")]
    LockPoisoned,
    #[error("Invalid path: {0}")]
    InvalidPath(#[from] TrackedPathError),
    #[error(transparent)]
    Source(#[from] SourceFileError),
    #[error("Checkpoint write failed after {attempts} attempts: {source}")]
    Persist {
        attempts: u32,
        #[source]
        source: Box<CheckpointStoreError>,
    },
}

/// How `get_or_create` arrived at the returned checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// A valid checkpoint existed and was resumed.
    Resumed,
    /// No checkpoint existed.
    Created,
    /// A stale checkpoint was discarded and replaced at chunk 0.
    Restarted(Invalidation),
}

impl Freshness {
    pub fn is_restarted(&self) -> bool {
        matches!(self, Freshness::Restarted(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    pub removed: usize,
    pub cancelled: bool,
}

struct StoreState {
    records: CheckpointSet,
    cache: ChunkCache,
}

/// Owner of every checkpoint record and of the derived chunk cache.
///
/// All read-modify-write sequences run under one lock. A mutation is applied
/// to a copy of the record set, persisted, and only then committed, so the
/// in-memory and persisted states are equal whenever a call returns.
pub struct CheckpointStore {
    backend: Box<dyn CheckpointBackend>,
    state: Mutex<StoreState>,
}

impl CheckpointStore {
    pub fn open(backend: impl CheckpointBackend + 'static) -> Result<Self, CheckpointStoreError> {
        let records = backend.load()?;
        debug!(records = records.len(), "checkpoint store opened");

        Ok(Self {
            backend: Box::new(backend),
            state: Mutex::new(StoreState {
                records,
                cache: ChunkCache::new(),
            }),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            backend: Box::new(MemoryBackend::new()),
            state: Mutex::new(StoreState {
                records: CheckpointSet::new(),
                cache: ChunkCache::new(),
            }),
        }
    }

    /// Return the valid checkpoint for `path`, creating or replacing it as
    /// needed, with its chunks present in the cache.
    pub fn get_or_create(
        &self,
        path: &Path,
        max_chunk_chars: usize,
    ) -> Result<(Checkpoint, Freshness), CheckpointStoreError> {
        let key = TrackedPath::resolve(path)?;
        let mut state = self.lock()?;

        let existing = state.records.get(&key).cloned();
        let (source, freshness) = match existing {
            None => (SourceFile::load(path)?, Freshness::Created),
            Some(record) => {
                let current = fingerprint(path).map_err(|source| SourceFileError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;

                match check_checkpoint(&record, &current, max_chunk_chars) {
                    None => match self.resume(&mut state, &key, path, record)? {
                        Ok(resumed) => return Ok((resumed, Freshness::Resumed)),
                        Err((source, invalidation)) => (source, Freshness::Restarted(invalidation)),
                    },
                    Some(invalidation) => (SourceFile::load(path)?, Freshness::Restarted(invalidation)),
                }
            }
        };

        if let Freshness::Restarted(reason) = &freshness {
            info!(path = %key, %reason, "stale checkpoint discarded, restarting at chunk 0");
        }

        let (checkpoint, _) = self.create(&mut state, key, &source, max_chunk_chars)?;
        Ok((checkpoint, freshness))
    }

    /// Chunks of `source` for a context digest.
    ///
    /// Creates a checkpoint when none exists but never replaces a stale one;
    /// restarting is left to [`get_or_create`](Self::get_or_create). Chunks
    /// for a stale record are split from `source` without touching the
    /// record or the cache.
    pub fn context_chunks(
        &self,
        path: &Path,
        source: &SourceFile,
        max_chunk_chars: usize,
    ) -> Result<Arc<[Chunk]>, CheckpointStoreError> {
        let key = TrackedPath::resolve(path)?;
        let mut state = self.lock()?;

        let record = match state.records.get(&key).cloned() {
            Some(record) => record,
            None => return Ok(self.create(&mut state, key, source, max_chunk_chars)?.1),
        };

        if let Some(reason) = check_checkpoint(&record, &source.hash, max_chunk_chars) {
            debug!(path = %key, %reason, "stale checkpoint left for the reader to restart");
            return Ok(split(&source.content, max_chunk_chars).into());
        }

        let chunking_key = record.chunking_key();
        if let Some(chunks) = state.cache.get(&key, &chunking_key) {
            return Ok(chunks);
        }

        let chunks = split(&source.content, max_chunk_chars);
        if chunks.len() != record.total_chunks {
            return Ok(chunks.into());
        }
        Ok(state.cache.insert(key, chunking_key, chunks))
    }

    /// Persist a fresh checkpoint at chunk 0 for `source` and cache its chunks.
    fn create(
        &self,
        state: &mut StoreState,
        key: TrackedPath,
        source: &SourceFile,
        max_chunk_chars: usize,
    ) -> Result<(Checkpoint, Arc<[Chunk]>), CheckpointStoreError> {
        state.cache.invalidate(&key);

        let chunks = split(&source.content, max_chunk_chars);
        let checkpoint = Checkpoint::new(key.clone(), source, chunks.len(), max_chunk_chars, Utc::now());

        let stored = checkpoint.clone();
        self.commit(state, |records| {
            records.insert(key.clone(), stored);
        })?;
        let chunks = state.cache.insert(key.clone(), checkpoint.chunking_key(), chunks);

        info!(
            path = %key,
            total_chunks = checkpoint.total_chunks,
            size_bytes = checkpoint.size_bytes,
            "checkpoint created"
        );
        Ok((checkpoint, chunks))
    }

    /// Refresh a valid record, re-deriving its chunks if the cache lost them.
    ///
    /// The inner `Err` carries the freshly loaded file when re-derivation
    /// shows the record can no longer be trusted.
    #[allow(clippy::type_complexity)]
    fn resume(
        &self,
        state: &mut StoreState,
        key: &TrackedPath,
        path: &Path,
        record: Checkpoint,
    ) -> Result<Result<Checkpoint, (SourceFile, Invalidation)>, CheckpointStoreError> {
        let chunking_key = record.chunking_key();

        if state.cache.get(key, &chunking_key).is_none() {
            let source = SourceFile::load(path)?;
            if source.hash != record.content_hash {
                let invalidation = Invalidation::ContentChanged {
                    recorded: record.content_hash.clone(),
                    current: source.hash.clone(),
                };
                return Ok(Err((source, invalidation)));
            }

            let chunks = split(&source.content, record.chunk_size_limit);
            if chunks.len() != record.total_chunks {
                let invalidation = Invalidation::ChunkCountDrift {
                    recorded: record.total_chunks,
                    derived: chunks.len(),
                };
                return Ok(Err((source, invalidation)));
            }

            debug!(path = %key, chunks = chunks.len(), "re-derived chunks for existing checkpoint");
            state.cache.insert(key.clone(), chunking_key, chunks);
        } else {
            debug!(path = %key, "chunk cache hit");
        }

        let mut updated = record;
        updated.touch(Utc::now());
        let stored = updated.clone();
        self.commit(state, |records| {
            records.insert(key.clone(), stored);
        })?;

        Ok(Ok(updated))
    }

    /// Hand out the chunk under the cursor and move the cursor forward.
    ///
    /// `None` once the cursor reached the end, or when no checkpoint exists.
    pub fn advance(&self, path: &Path) -> Result<Option<Chunk>, CheckpointStoreError> {
        let key = TrackedPath::resolve(path)?;
        let mut state = self.lock()?;

        let record = match state.records.get(&key) {
            Some(record) => record.clone(),
            None => return Ok(None),
        };
        if record.is_complete() {
            return Ok(None);
        }

        let chunk = match state
            .cache
            .get(&key, &record.chunking_key())
            .and_then(|chunks| chunks.get(record.current_chunk_index).cloned())
        {
            Some(chunk) => chunk,
            None => {
                debug!(path = %key, "no cached chunks for checkpoint");
                return Ok(None);
            }
        };

        let mut updated = record;
        updated.current_chunk_index += 1;
        updated.touch(Utc::now());
        debug!(
            path = %key,
            current = updated.current_chunk_index,
            total = updated.total_chunks,
            "cursor advanced"
        );

        self.commit(&mut state, |records| {
            records.insert(key, updated);
        })?;

        Ok(Some(chunk))
    }

    /// Delete the checkpoint and its cached chunks. Returns whether a
    /// checkpoint existed.
    pub fn reset(&self, path: &Path) -> Result<bool, CheckpointStoreError> {
        let key = TrackedPath::resolve(path)?;
        let mut state = self.lock()?;

        state.cache.invalidate(&key);
        if !state.records.contains_key(&key) {
            return Ok(false);
        }

        self.commit(&mut state, |records| {
            records.remove(&key);
        })?;
        info!(path = %key, "checkpoint reset");
        Ok(true)
    }

    /// Delete every checkpoint not accessed within `max_age`.
    pub fn sweep(&self, max_age: Duration) -> Result<usize, CheckpointStoreError> {
        let never = AtomicBool::new(false);
        let outcome = self.sweep_cancellable(Utc::now() - max_age, &never)?;
        Ok(outcome.removed)
    }

    /// Delete every checkpoint last accessed before `cutoff`.
    ///
    /// `cancel` is checked once per record; records already found expired
    /// when it trips are still removed.
    pub fn sweep_cancellable(
        &self,
        cutoff: DateTime<Utc>,
        cancel: &AtomicBool,
    ) -> Result<SweepOutcome, CheckpointStoreError> {
        let mut state = self.lock()?;

        let mut expired = Vec::new();
        let mut cancelled = false;
        for (path, record) in &state.records {
            if cancel.load(Ordering::Relaxed) {
                cancelled = true;
                break;
            }
            if record.last_access_time < cutoff {
                expired.push(path.clone());
            }
        }

        if !expired.is_empty() {
            self.commit(&mut state, |records| {
                for path in &expired {
                    records.remove(path);
                }
            })?;
            for path in &expired {
                state.cache.invalidate(path);
            }
            info!(removed = expired.len(), cancelled, "expired checkpoints swept");
        }

        Ok(SweepOutcome {
            removed: expired.len(),
            cancelled,
        })
    }

    pub fn get(&self, path: &Path) -> Result<Option<Checkpoint>, CheckpointStoreError> {
        let key = TrackedPath::resolve(path)?;
        let state = self.lock()?;
        Ok(state.records.get(&key).cloned())
    }

    pub fn progress(&self, path: &Path) -> Result<Option<Progress>, CheckpointStoreError> {
        Ok(self.get(path)?.map(|record| record.progress()))
    }

    /// Cached chunks for the file's current checkpoint, if any.
    pub fn chunks(&self, path: &Path) -> Result<Option<Arc<[Chunk]>>, CheckpointStoreError> {
        let key = TrackedPath::resolve(path)?;
        let state = self.lock()?;
        Ok(state
            .records
            .get(&key)
            .and_then(|record| state.cache.get(&key, &record.chunking_key())))
    }

    /// Random access into the cached chunks; does not move the cursor.
    pub fn chunk_at(&self, path: &Path, index: usize) -> Result<Option<Chunk>, CheckpointStoreError> {
        Ok(self
            .chunks(path)?
            .and_then(|chunks| chunks.get(index).cloned()))
    }

    /// Whether chunks for `path` are currently held in memory.
    pub fn is_cached(&self, path: &Path) -> Result<bool, CheckpointStoreError> {
        let key = TrackedPath::resolve(path)?;
        Ok(self.lock()?.cache.contains(&key))
    }

    pub fn len(&self) -> Result<usize, CheckpointStoreError> {
        Ok(self.lock()?.records.len())
    }

    pub fn is_empty(&self) -> Result<bool, CheckpointStoreError> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, CheckpointStoreError> {
        self.state.lock().map_err(|_| CheckpointStoreError::LockPoisoned)
    }

    fn commit<F>(&self, state: &mut StoreState, mutate: F) -> Result<(), CheckpointStoreError>
    where
        F: FnOnce(&mut CheckpointSet),
    {
        let mut next = state.records.clone();
        mutate(&mut next);
        self.persist(&next)?;
        state.records = next;
        Ok(())
    }

    fn persist(&self, records: &CheckpointSet) -> Result<(), CheckpointStoreError> {
        if let Err(first) = self.backend.save(records) {
            warn!(error = %first, "checkpoint write failed, retrying once");
            self.backend
                .save(records)
                .map_err(|source| CheckpointStoreError::Persist {
                    attempts: 2,
                    source: Box::new(source),
                })?;
        }
        Ok(())
    }
}
