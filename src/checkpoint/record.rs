use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::ChunkingKey;
use crate::document::SourceFile;
use crate::types::identifiers::{ContentHash, TrackedPath};

/// Persisted read cursor for one large file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub path: TrackedPath,
    pub size_bytes: u64,
    pub content_hash: ContentHash,
    pub total_chunks: usize,
    pub current_chunk_index: usize,
    pub chunk_size_limit: usize,
    pub last_access_time: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(
        path: TrackedPath,
        source: &SourceFile,
        total_chunks: usize,
        chunk_size_limit: usize,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            path,
            size_bytes: source.size_bytes,
            content_hash: source.hash.clone(),
            total_chunks,
            current_chunk_index: 0,
            chunk_size_limit,
            last_access_time: now,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current_chunk_index >= self.total_chunks
    }

    pub fn progress(&self) -> Progress {
        Progress::new(self.current_chunk_index, self.total_chunks)
    }

    pub fn chunking_key(&self) -> ChunkingKey {
        ChunkingKey::new(self.content_hash.clone(), self.chunk_size_limit)
    }

    /// Refresh the access time. Never moves it backwards, even if the wall
    /// clock does.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_access_time = self.last_access_time.max(now);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub current_chunk: usize,
    pub total_chunks: usize,
    pub percent: f64,
}

impl Progress {
    pub fn new(current_chunk: usize, total_chunks: usize) -> Self {
        let percent = if total_chunks == 0 {
            100.0
        } else {
            current_chunk as f64 / total_chunks as f64 * 100.0
        };
        Self {
            current_chunk,
            total_chunks,
            percent,
        }
    }
}
