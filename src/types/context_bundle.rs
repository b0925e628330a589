use serde::{Deserialize, Serialize};

use crate::document::Chunk;

/// Lexical signals found in a chunk. Serialized with each selected chunk so
/// the priority can be explained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDetails {
    pub type_definition: bool,
    pub function_definition: bool,
    pub imports: bool,
    pub entry_point: bool,
    /// 0..=10, from the share of non-blank lines.
    pub density_bonus: u32,
}

/// A chunk admitted into a context digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedChunk {
    pub index: usize,
    pub start_line: usize,
    pub end_line: usize,
    /// Owned: possibly a truncated copy of the chunk's content.
    pub content: String,
    pub char_count: usize,

    pub priority: u32,
    pub truncated: bool,

    pub why: ScoreDetails,
}

/// Metadata describing the outcome of the selection process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionMetadata {
    pub budget: usize,

    /// Characters of the rendered text, separators included.
    pub chars_used: usize,

    pub chunks_considered: usize,
    pub chunks_selected: usize,
    pub chunks_excluded_by_budget: usize,

    /// Nothing could be admitted, not even a truncated chunk.
    pub budget_too_small: bool,
}

/// Admitted chunks in file order, plus how they were chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    pub chunks: Vec<SelectedChunk>,
    pub selection: SelectionMetadata,
}

impl SelectionResult {
    /// Admitted content joined with `\n`.
    pub fn render(&self) -> String {
        self.chunks
            .iter()
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Internal: a chunk scored but not yet selected.
/// Borrows the chunk to avoid cloning content that may never be admitted.
#[derive(Debug, Clone)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a Chunk,

    pub score: u32,
    pub score_details: ScoreDetails,
}
