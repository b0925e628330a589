use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::document::{split, Chunk, SourceFile};
use crate::engine::{IngestEngine, Result};
use crate::selection::Scorer;
use crate::types::context_bundle::SelectionMetadata;
use crate::types::read_result::Summary;

impl<S: Scorer> IngestEngine<S> {
    /// Compress a file into at most `max_budget_chars` characters of its most
    /// relevant chunks, in file order.
    ///
    /// A truncated final chunk may add up to the truncation marker's length
    /// beyond what was cut; the text never exceeds the budget otherwise.
    pub fn summarize_for_context(&self, path: &Path, max_budget_chars: usize) -> Result<Summary> {
        let source = SourceFile::load(path)?;
        let total_chars = source.char_count();

        if total_chars <= max_budget_chars {
            return Ok(Summary {
                text: source.content,
                truncated: false,
                sections: Vec::new(),
                selection: SelectionMetadata {
                    budget: max_budget_chars,
                    chars_used: total_chars,
                    chunks_considered: 0,
                    chunks_selected: 0,
                    chunks_excluded_by_budget: 0,
                    budget_too_small: false,
                },
            });
        }

        let chunks = self.chunks_for_context(path, &source)?;
        let result = self.selector.select(&chunks, max_budget_chars);

        if result.selection.budget_too_small {
            debug!(path = %path.display(), budget = max_budget_chars, "budget too small for any chunk");
        }

        let text = result.render();
        let truncated = result.chunks.len() < chunks.len() || result.chunks.iter().any(|c| c.truncated);

        Ok(Summary {
            text,
            truncated,
            sections: result.chunks,
            selection: result.selection,
        })
    }

    /// Same as [`summarize_for_context`] with the configured budget.
    ///
    /// [`summarize_for_context`]: IngestEngine::summarize_for_context
    pub fn summarize_default(&self, path: &Path) -> Result<Summary> {
        self.summarize_for_context(path, self.config.max_context_budget_chars)
    }

    /// Large files go through the checkpoint store so their chunks are
    /// cached; small files are split on the spot.
    fn chunks_for_context(&self, path: &Path, source: &SourceFile) -> Result<Arc<[Chunk]>> {
        let limit = self.config.max_chunk_chars;
        if source.size_bytes <= self.config.large_file_threshold_bytes {
            return Ok(split(&source.content, limit).into());
        }

        Ok(self.store.context_chunks(path, source, limit)?)
    }
}
