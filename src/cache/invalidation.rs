use std::fmt;

use crate::checkpoint::Checkpoint;
use crate::types::identifiers::ContentHash;

/// Why a persisted checkpoint can no longer be resumed.
///
/// Never surfaced as a failure: the store replaces the checkpoint and the
/// reader reports `restarted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    ContentChanged {
        recorded: ContentHash,
        current: ContentHash,
    },
    ChunkLimitChanged {
        recorded: usize,
        configured: usize,
    },
    /// Re-deriving chunks after a restart produced a different count than the
    /// record claims (hand-edited record or a changed splitting rule).
    ChunkCountDrift {
        recorded: usize,
        derived: usize,
    },
}

impl fmt::Display for Invalidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invalidation::ContentChanged { recorded, current } => {
                write!(f, "content changed ({recorded} -> {current})")
            }
            Invalidation::ChunkLimitChanged {
                recorded,
                configured,
            } => write!(f, "chunk limit changed ({recorded} -> {configured})"),
            Invalidation::ChunkCountDrift { recorded, derived } => {
                write!(f, "chunk count drift ({recorded} recorded, {derived} derived)")
            }
        }
    }
}

/// Check a record against the file's current fingerprint and the configured
/// chunk limit.
pub fn check_checkpoint(
    checkpoint: &Checkpoint,
    current_hash: &ContentHash,
    configured_limit: usize,
) -> Option<Invalidation> {
    if &checkpoint.content_hash != current_hash {
        return Some(Invalidation::ContentChanged {
            recorded: checkpoint.content_hash.clone(),
            current: current_hash.clone(),
        });
    }

    if checkpoint.chunk_size_limit != configured_limit {
        return Some(Invalidation::ChunkLimitChanged {
            recorded: checkpoint.chunk_size_limit,
            configured: configured_limit,
        });
    }

    None
}
