pub mod ranking;
pub mod budgeting;

use std::cmp::Ordering;

use crate::document::Chunk;
use crate::types::context_bundle::{ScoredChunk, SelectionMetadata, SelectionResult};
pub use budgeting::{apply_budget, BudgetResult, TRUNCATION_MARKER};
pub use ranking::{LexicalPriorityScorer, Scorer};

pub struct ChunkSelector<S> {
	scorer: S,
}

impl Default for ChunkSelector<LexicalPriorityScorer> {
	fn default() -> Self {
		Self {
			scorer: LexicalPriorityScorer,
		}
	}
}

impl<S> ChunkSelector<S>
where
	S: Scorer,
{
	pub fn new(scorer: S) -> Self {
		Self { scorer }
	}

	pub fn select(&self, chunks: &[Chunk], budget: usize) -> SelectionResult {
		// 1. Scoring Phase
		let mut scored_chunks: Vec<ScoredChunk> = chunks
			.iter()
			.map(|chunk| {
				let details = self.scorer.score(chunk);
				let score = self.scorer.score_value(&details);
				ScoredChunk {
					chunk,
					score,
					score_details: details,
				}
			})
			.collect();

		// 2. Priority Phase
		// Sort by (score desc, index asc)
		scored_chunks.sort_by(|a, b| match b.score.cmp(&a.score) {
			Ordering::Equal => a.chunk.index.cmp(&b.chunk.index),
			other => other,
		});

		debug_assert!(
			scored_chunks.windows(2).all(|w| {
				let a = &w[0];
				let b = &w[1];
				a.score > b.score || (a.score == b.score && a.chunk.index < b.chunk.index)
			})
		);

		// 3. Budgeting Phase
		let BudgetResult {
			mut selected,
			chars_used,
			chunks_selected,
			chunks_excluded_by_budget,
		} = apply_budget(scored_chunks, budget);

		// 4. Order Restoration Phase
		// Consumers read the digest top to bottom.
		selected.sort_by_key(|c| c.index);

		let metadata = SelectionMetadata {
			budget,
			chars_used,
			chunks_considered: chunks.len(),
			chunks_selected,
			chunks_excluded_by_budget,
			budget_too_small: chunks_selected == 0 && !chunks.is_empty(),
		};

		SelectionResult {
			chunks: selected,
			selection: metadata,
		}
	}
}
