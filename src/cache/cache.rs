// Derived state only:
// never the source of truth
// dropping any entry is always safe

use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::ChunkingKey;
use crate::document::Chunk;
use crate::types::identifiers::TrackedPath;

#[derive(Debug, Clone)]
struct CachedChunks {
    key: ChunkingKey,
    chunks: Arc<[Chunk]>,
}

/// In-memory chunk lists for files with an active checkpoint.
#[derive(Debug, Default)]
pub struct ChunkCache {
    entries: HashMap<TrackedPath, CachedChunks>,
}

impl ChunkCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: TrackedPath, key: ChunkingKey, chunks: Vec<Chunk>) -> Arc<[Chunk]> {
        let chunks: Arc<[Chunk]> = chunks.into();
        self.entries.insert(
            path,
            CachedChunks {
                key,
                chunks: Arc::clone(&chunks),
            },
        );
        chunks
    }

    /// Chunks for `path`, only if they were derived under `key`.
    pub fn get(&self, path: &TrackedPath, key: &ChunkingKey) -> Option<Arc<[Chunk]>> {
        self.entries
            .get(path)
            .filter(|entry| &entry.key == key)
            .map(|entry| Arc::clone(&entry.chunks))
    }

    pub fn invalidate(&mut self, path: &TrackedPath) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn contains(&self, path: &TrackedPath) -> bool {
        self.entries.contains_key(path)
    }
}
