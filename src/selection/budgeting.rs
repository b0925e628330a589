use crate::types::context_bundle::{ScoredChunk, SelectedChunk};

/// Appended to a chunk cut short to fit the budget.
pub const TRUNCATION_MARKER: &str = "\n... (content truncated)";

/// A truncated copy is only worth admitting with at least this much room.
pub const MIN_TRUNCATION_ROOM: usize = 500;

/// Room held back from a truncated copy for the marker.
pub const TRUNCATION_RESERVE: usize = 50;

/// Chunks are rendered joined by a single `\n`.
const SEPARATOR_CHARS: usize = 1;

pub struct BudgetResult {
    pub selected: Vec<SelectedChunk>,
    pub chars_used: usize,
    pub chunks_selected: usize,
    pub chunks_excluded_by_budget: usize,
}

/// Greedy admission over chunks already sorted by priority.
///
/// The separator in front of every admitted chunk but the first is charged
/// to the budget, so the rendered text never exceeds it.
pub fn apply_budget(scored_chunks: Vec<ScoredChunk>, budget: usize) -> BudgetResult {
    let total = scored_chunks.len();
    let mut selected = Vec::new();
    let mut chars_used = 0;

    for schunk in scored_chunks {
        let separator = if selected.is_empty() { 0 } else { SEPARATOR_CHARS };
        let cost = schunk.chunk.char_count + separator;

        if chars_used + cost <= budget {
            selected.push(admit(&schunk, schunk.chunk.content.clone(), false));
            chars_used += cost;
            continue;
        }

        let remaining = budget - chars_used;
        if remaining >= MIN_TRUNCATION_ROOM {
            let keep = remaining - TRUNCATION_RESERVE - separator;
            let mut content: String = schunk.chunk.content.chars().take(keep).collect();
            content.push_str(TRUNCATION_MARKER);

            chars_used += separator + keep + TRUNCATION_MARKER.chars().count();
            selected.push(admit(&schunk, content, true));
        }
        break;
    }

    let chunks_selected = selected.len();
    BudgetResult {
        selected,
        chars_used,
        chunks_selected,
        chunks_excluded_by_budget: total - chunks_selected,
    }
}

fn admit(schunk: &ScoredChunk, content: String, truncated: bool) -> SelectedChunk {
    SelectedChunk {
        index: schunk.chunk.index,
        start_line: schunk.chunk.start_line,
        end_line: schunk.chunk.end_line,
        char_count: content.chars().count(),
        content,
        priority: schunk.score,
        truncated,
        why: schunk.score_details.clone(),
    }
}
