use serde::{Deserialize, Serialize};

/// A line-aligned slice of a file, the unit of streaming and selection.
///
/// Chunks are derived from file content on demand and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// 0-based position in the file's chunk sequence.
    pub index: usize,
    /// 1-based, inclusive.
    pub start_line: usize,
    /// 1-based, inclusive.
    pub end_line: usize,
    /// Byte offset of the first byte covered.
    pub start_byte: usize,
    /// Byte offset one past the last byte covered, line terminators included.
    pub end_byte: usize,
    /// Text of the covered lines with one trailing `\n` removed.
    pub content: String,
    /// Unicode scalar values in `content`.
    pub char_count: usize,
}

impl Chunk {
    pub fn line_count(&self) -> usize {
        self.end_line + 1 - self.start_line
    }
}
