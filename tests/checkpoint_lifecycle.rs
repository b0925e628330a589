use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{Duration, Utc};
use context_ingest::cache::Invalidation;
use context_ingest::checkpoint::{
    Checkpoint, CheckpointBackend, CheckpointSet, CheckpointStore, CheckpointStoreError, Freshness,
    JsonFileBackend, MemoryBackend,
};
use context_ingest::document::SourceFile;
use context_ingest::types::TrackedPath;
use tempfile::tempdir;

fn write_lines(dir: &Path, name: &str, count: usize) -> PathBuf {
    let mut content = String::new();
    for i in 0..count {
        content.push_str(&format!("{:05} {}\n", i, "x".repeat(73)));
    }
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Fails the next `failures` saves, then delegates.
struct FlakyBackend {
    inner: MemoryBackend,
    failures: AtomicUsize,
}

impl FlakyBackend {
    fn new() -> Self {
        Self {
            inner: MemoryBackend::new(),
            failures: AtomicUsize::new(0),
        }
    }

    fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }
}

impl CheckpointBackend for FlakyBackend {
    fn load(&self) -> Result<CheckpointSet, CheckpointStoreError> {
        self.inner.load()
    }

    fn save(&self, records: &CheckpointSet) -> Result<(), CheckpointStoreError> {
        let left = self.failures.load(Ordering::SeqCst);
        if left > 0 {
            self.failures.store(left - 1, Ordering::SeqCst);
            return Err(io::Error::new(io::ErrorKind::Other, "disk full").into());
        }
        self.inner.save(records)
    }
}

#[test]
fn get_or_create_then_resume() {
    let dir = tempdir().unwrap();
    let path = write_lines(dir.path(), "big.txt", 1000);
    let store = CheckpointStore::in_memory();

    let (created, freshness) = store.get_or_create(&path, 8000).unwrap();
    assert_eq!(freshness, Freshness::Created);
    assert_eq!(created.total_chunks, 10);
    assert_eq!(created.current_chunk_index, 0);
    assert_eq!(created.chunk_size_limit, 8000);
    assert_eq!(created.size_bytes, 80_000);

    let first = store.advance(&path).unwrap().unwrap();
    assert_eq!(first.index, 0);

    let (resumed, freshness) = store.get_or_create(&path, 8000).unwrap();
    assert_eq!(freshness, Freshness::Resumed);
    assert_eq!(resumed.current_chunk_index, 1);
    assert!(resumed.last_access_time >= created.last_access_time);
}

#[test]
fn advance_stops_at_total_chunks() {
    let dir = tempdir().unwrap();
    let path = write_lines(dir.path(), "big.txt", 300);
    let store = CheckpointStore::in_memory();
    store.get_or_create(&path, 8000).unwrap();

    let mut indices = Vec::new();
    while let Some(chunk) = store.advance(&path).unwrap() {
        indices.push(chunk.index);
    }

    assert_eq!(indices, vec![0, 1, 2]);
    assert!(store.advance(&path).unwrap().is_none());
    let progress = store.progress(&path).unwrap().unwrap();
    assert_eq!(progress.current_chunk, 3);
    assert_eq!(progress.percent, 100.0);
}

#[test]
fn advance_without_checkpoint_is_none() {
    let dir = tempdir().unwrap();
    let path = write_lines(dir.path(), "big.txt", 10);
    let store = CheckpointStore::in_memory();

    assert!(store.advance(&path).unwrap().is_none());
    assert!(store.is_empty().unwrap());
}

#[test]
fn reset_removes_record_and_cache() {
    let dir = tempdir().unwrap();
    let path = write_lines(dir.path(), "big.txt", 300);
    let store = CheckpointStore::in_memory();
    store.get_or_create(&path, 8000).unwrap();
    assert!(store.is_cached(&path).unwrap());

    assert!(store.reset(&path).unwrap());
    assert!(store.get(&path).unwrap().is_none());
    assert!(!store.is_cached(&path).unwrap());
    assert!(!store.reset(&path).unwrap());
}

#[test]
fn content_change_invalidates() {
    let dir = tempdir().unwrap();
    let path = write_lines(dir.path(), "big.txt", 300);
    let store = CheckpointStore::in_memory();
    let (before, _) = store.get_or_create(&path, 8000).unwrap();
    store.advance(&path).unwrap();

    fs::write(&path, "changed\n".repeat(5000)).unwrap();

    let (after, freshness) = store.get_or_create(&path, 8000).unwrap();
    assert!(matches!(freshness, Freshness::Restarted(Invalidation::ContentChanged { .. })));
    assert_eq!(after.current_chunk_index, 0);
    assert_ne!(after.content_hash, before.content_hash);
    assert_eq!(store.advance(&path).unwrap().unwrap().content.lines().next(), Some("changed"));
}

#[test]
fn context_chunks_leave_stale_checkpoint_untouched() {
    let dir = tempdir().unwrap();
    let path = write_lines(dir.path(), "big.txt", 300);
    let store = CheckpointStore::in_memory();
    let (before, _) = store.get_or_create(&path, 8000).unwrap();
    store.advance(&path).unwrap();

    fs::write(&path, "changed\n".repeat(5000)).unwrap();
    let source = SourceFile::load(&path).unwrap();

    let chunks = store.context_chunks(&path, &source, 8000).unwrap();
    assert_eq!(chunks[0].content.lines().next(), Some("changed"));

    let record = store.get(&path).unwrap().unwrap();
    assert_eq!(record.content_hash, before.content_hash);
    assert_eq!(record.current_chunk_index, 1);

    let (_, freshness) = store.get_or_create(&path, 8000).unwrap();
    assert!(matches!(freshness, Freshness::Restarted(Invalidation::ContentChanged { .. })));
}

#[test]
fn context_chunks_create_missing_checkpoint() {
    let dir = tempdir().unwrap();
    let path = write_lines(dir.path(), "big.txt", 300);
    let store = CheckpointStore::in_memory();
    let source = SourceFile::load(&path).unwrap();

    let chunks = store.context_chunks(&path, &source, 8000).unwrap();
    let record = store.get(&path).unwrap().unwrap();
    assert_eq!(record.total_chunks, chunks.len());
    assert_eq!(record.current_chunk_index, 0);
    assert!(store.is_cached(&path).unwrap());
}

#[test]
fn chunk_limit_change_invalidates() {
    let dir = tempdir().unwrap();
    let path = write_lines(dir.path(), "big.txt", 300);
    let store = CheckpointStore::in_memory();
    store.get_or_create(&path, 8000).unwrap();

    let (checkpoint, freshness) = store.get_or_create(&path, 4000).unwrap();
    assert_eq!(
        freshness,
        Freshness::Restarted(Invalidation::ChunkLimitChanged {
            recorded: 8000,
            configured: 4000,
        })
    );
    assert_eq!(checkpoint.total_chunks, 6);
}

#[test]
fn checkpoints_survive_a_new_store() {
    let dir = tempdir().unwrap();
    let path = write_lines(dir.path(), "big.txt", 1000);
    let state_file = dir.path().join("state").join("checkpoints.json");

    {
        let store = CheckpointStore::open(JsonFileBackend::new(&state_file)).unwrap();
        store.get_or_create(&path, 8000).unwrap();
        for _ in 0..4 {
            store.advance(&path).unwrap();
        }
    }

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&state_file).unwrap()).unwrap();
    let key = TrackedPath::resolve(&path).unwrap();
    assert_eq!(raw[key.as_str()]["current_chunk_index"], 4);
    assert_eq!(raw[key.as_str()]["total_chunks"], 10);

    let store = CheckpointStore::open(JsonFileBackend::new(&state_file)).unwrap();
    assert!(!store.is_cached(&path).unwrap());

    let (checkpoint, freshness) = store.get_or_create(&path, 8000).unwrap();
    assert_eq!(freshness, Freshness::Resumed);
    assert_eq!(checkpoint.current_chunk_index, 4);
    assert_eq!(store.advance(&path).unwrap().unwrap().index, 4);
}

#[test]
fn missing_checkpoint_file_is_empty() {
    let dir = tempdir().unwrap();
    let store = CheckpointStore::open(JsonFileBackend::new(dir.path().join("absent.json"))).unwrap();
    assert_eq!(store.len().unwrap(), 0);
}

#[test]
fn malformed_checkpoint_file_is_empty_and_rewritten() {
    let dir = tempdir().unwrap();
    let state_file = dir.path().join("checkpoints.json");
    fs::write(&state_file, "{ not json").unwrap();
    let path = write_lines(dir.path(), "big.txt", 300);

    let store = CheckpointStore::open(JsonFileBackend::new(&state_file)).unwrap();
    assert_eq!(store.len().unwrap(), 0);

    store.get_or_create(&path, 8000).unwrap();
    let reloaded = JsonFileBackend::new(&state_file).load().unwrap();
    assert_eq!(reloaded.len(), 1);
}

#[test]
fn failed_write_is_retried_once() {
    let dir = tempdir().unwrap();
    let path = write_lines(dir.path(), "big.txt", 300);
    let backend = Arc::new(FlakyBackend::new());
    let store = CheckpointStore::open(Arc::clone(&backend)).unwrap();
    store.get_or_create(&path, 8000).unwrap();

    backend.fail_next(1);
    let chunk = store.advance(&path).unwrap();
    assert_eq!(chunk.unwrap().index, 0);

    let persisted = backend.inner.snapshot().unwrap();
    let record = persisted.values().next().unwrap();
    assert_eq!(record.current_chunk_index, 1);
}

#[test]
fn failed_retry_leaves_memory_equal_to_disk() {
    let dir = tempdir().unwrap();
    let path = write_lines(dir.path(), "big.txt", 300);
    let backend = Arc::new(FlakyBackend::new());
    let store = CheckpointStore::open(Arc::clone(&backend)).unwrap();
    store.get_or_create(&path, 8000).unwrap();

    backend.fail_next(2);
    let err = store.advance(&path).unwrap_err();
    assert!(matches!(err, CheckpointStoreError::Persist { attempts: 2, .. }));

    let in_memory = store.get(&path).unwrap().unwrap();
    let on_disk = backend.inner.snapshot().unwrap();
    assert_eq!(in_memory.current_chunk_index, 0);
    assert_eq!(on_disk.values().next(), Some(&in_memory));

    assert_eq!(store.advance(&path).unwrap().unwrap().index, 0);
}

#[test]
fn sweep_removes_only_stale_records() {
    let dir = tempdir().unwrap();
    let fresh_path = write_lines(dir.path(), "fresh.txt", 300);
    let stale_path = write_lines(dir.path(), "stale.txt", 300);

    let source = SourceFile::load(&stale_path).unwrap();
    let stale_key = TrackedPath::resolve(&stale_path).unwrap();
    let mut records = CheckpointSet::new();
    records.insert(
        stale_key.clone(),
        Checkpoint::new(stale_key, &source, 3, 8000, Utc::now() - Duration::days(30)),
    );

    let store = CheckpointStore::open(MemoryBackend::with_records(records)).unwrap();
    store.get_or_create(&fresh_path, 8000).unwrap();
    assert_eq!(store.len().unwrap(), 2);

    assert_eq!(store.sweep(Duration::days(7)).unwrap(), 1);
    assert!(store.get(&stale_path).unwrap().is_none());
    assert!(store.get(&fresh_path).unwrap().is_some());
    assert_eq!(store.sweep(Duration::days(7)).unwrap(), 0);
}

#[test]
fn cancelled_sweep_stops_before_first_record() {
    let dir = tempdir().unwrap();
    let a = write_lines(dir.path(), "a.txt", 300);
    let b = write_lines(dir.path(), "b.txt", 300);
    let store = CheckpointStore::in_memory();
    store.get_or_create(&a, 8000).unwrap();
    store.get_or_create(&b, 8000).unwrap();

    let cutoff = Utc::now() + Duration::days(1);

    let cancel = AtomicBool::new(true);
    let outcome = store.sweep_cancellable(cutoff, &cancel).unwrap();
    assert!(outcome.cancelled);
    assert_eq!(outcome.removed, 0);
    assert_eq!(store.len().unwrap(), 2);

    cancel.store(false, Ordering::Relaxed);
    let outcome = store.sweep_cancellable(cutoff, &cancel).unwrap();
    assert!(!outcome.cancelled);
    assert_eq!(outcome.removed, 2);
    assert!(!store.is_cached(&a).unwrap());
}

#[test]
fn chunk_at_does_not_move_cursor() {
    let dir = tempdir().unwrap();
    let path = write_lines(dir.path(), "big.txt", 300);
    let store = CheckpointStore::in_memory();
    store.get_or_create(&path, 8000).unwrap();

    let chunk = store.chunk_at(&path, 2).unwrap().unwrap();
    assert_eq!(chunk.index, 2);
    assert_eq!(chunk.start_line, 201);
    assert!(store.chunk_at(&path, 3).unwrap().is_none());
    assert_eq!(store.get(&path).unwrap().unwrap().current_chunk_index, 0);
}
