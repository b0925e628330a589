use serde::{Deserialize, Serialize};

use crate::document::Chunk;
use crate::types::context_bundle::{SelectedChunk, SelectionMetadata};

/// One delivery from the resumable reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadResult {
    /// Delivered chunk contents joined with `\n`, or the whole small file.
    pub content: String,
    pub chunks: Vec<ChunkInfo>,

    pub current_chunk: usize,
    pub total_chunks: usize,
    pub progress_percent: f64,
    pub is_complete: bool,

    /// The file changed since the previous read; anything accumulated from
    /// earlier calls must be discarded.
    pub restarted: bool,

    pub file_info: FileInfo,
}

/// Position of a delivered chunk, without its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkInfo {
    pub index: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub line_count: usize,
    pub start_byte: usize,
    pub end_byte: usize,
    pub char_count: usize,
}

impl From<&Chunk> for ChunkInfo {
    fn from(chunk: &Chunk) -> Self {
        Self {
            index: chunk.index,
            start_line: chunk.start_line,
            end_line: chunk.end_line,
            line_count: chunk.line_count(),
            start_byte: chunk.start_byte,
            end_byte: chunk.end_byte,
            char_count: chunk.char_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub size_bytes: u64,
    pub is_large_file: bool,
    /// Present for large files only.
    pub total_chunks: Option<usize>,
    pub chunk_size_limit: Option<usize>,
}

/// A budget-bounded digest of one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub text: String,
    /// Some content was left out, or a chunk was cut short.
    pub truncated: bool,
    /// Admitted chunks in file order. Empty when the file fit whole.
    pub sections: Vec<SelectedChunk>,
    pub selection: SelectionMetadata,
}

/// Cheap facts about a file and its reading state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSummary {
    pub path: String,
    pub exists: bool,
    pub size_bytes: u64,
    /// Counted for small files only.
    pub lines: Option<usize>,
    pub is_large_file: bool,
    pub checkpoint_exists: bool,
    pub reading_progress: f64,
}
