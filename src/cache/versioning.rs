use serde::{Deserialize, Serialize};

use crate::types::identifiers::ContentHash;

// Key point:
// a chunk list is valid only for the exact bytes and limit it came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkingKey {
    pub content_hash: ContentHash,
    pub chunk_size_limit: usize,
}

impl ChunkingKey {
    pub fn new(content_hash: ContentHash, chunk_size_limit: usize) -> Self {
        Self {
            content_hash,
            chunk_size_limit,
        }
    }
}
