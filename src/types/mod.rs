pub mod context_bundle;
pub mod identifiers;
pub mod read_result;

pub use context_bundle::{ScoreDetails, ScoredChunk, SelectedChunk, SelectionMetadata, SelectionResult};
pub use identifiers::{ContentHash, TrackedPath, TrackedPathError};
pub use read_result::{ChunkInfo, FileInfo, FileSummary, ReadResult, Summary};
