use std::path::Path;

use tracing::{debug, info};

use crate::document::SourceFile;
use crate::engine::{IngestEngine, IngestError, Result};
use crate::selection::Scorer;
use crate::types::read_result::{ChunkInfo, FileInfo, ReadResult};

impl<S: Scorer> IngestEngine<S> {
    /// Read a file whole if it is small, otherwise deliver the next
    /// `max_chunks_per_call` chunks (at least one) and advance its checkpoint.
    ///
    /// Joining the `content` of successive calls with `\n` reproduces the
    /// file, minus a final trailing newline. After the last chunk, further
    /// calls fail with [`IngestError::NoMoreContent`] until [`reset`].
    ///
    /// [`reset`]: IngestEngine::reset
    pub fn read_file(&self, path: &Path, max_chunks_per_call: usize) -> Result<ReadResult> {
        let meta = std::fs::metadata(path).map_err(|e| IngestError::io(path, e))?;
        if meta.is_dir() {
            return Err(IngestError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "is a directory"),
            });
        }

        if meta.len() <= self.config.large_file_threshold_bytes {
            return self.read_whole(path);
        }

        let limit = self.config.max_chunk_chars;
        let (checkpoint, freshness) = self.store.get_or_create(path, limit)?;
        let restarted = freshness.is_restarted();
        if checkpoint.is_complete() {
            return Err(IngestError::NoMoreContent(path.to_path_buf()));
        }

        let mut delivered = Vec::new();
        for _ in 0..max_chunks_per_call.max(1) {
            match self.store.advance(path)? {
                Some(chunk) => delivered.push(chunk),
                None => break,
            }
        }
        if delivered.is_empty() {
            // Another caller drained or reset the checkpoint in between.
            return Err(IngestError::NoMoreContent(path.to_path_buf()));
        }

        let progress = match self.store.progress(path)? {
            Some(progress) => progress,
            None => checkpoint.progress(),
        };
        let is_complete = progress.current_chunk >= progress.total_chunks;
        if is_complete {
            info!(path = %path.display(), total_chunks = progress.total_chunks, "file fully delivered");
        } else {
            debug!(
                path = %path.display(),
                current = progress.current_chunk,
                total = progress.total_chunks,
                "chunks delivered"
            );
        }

        let content = delivered
            .iter()
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        Ok(ReadResult {
            content,
            chunks: delivered.iter().map(ChunkInfo::from).collect(),
            current_chunk: progress.current_chunk,
            total_chunks: progress.total_chunks,
            progress_percent: progress.percent,
            is_complete,
            restarted,
            file_info: FileInfo {
                size_bytes: checkpoint.size_bytes,
                is_large_file: true,
                total_chunks: Some(checkpoint.total_chunks),
                chunk_size_limit: Some(checkpoint.chunk_size_limit),
            },
        })
    }

    fn read_whole(&self, path: &Path) -> Result<ReadResult> {
        let source = SourceFile::load(path)?;

        Ok(ReadResult {
            content: source.content,
            chunks: Vec::new(),
            current_chunk: 0,
            total_chunks: 0,
            progress_percent: 100.0,
            is_complete: true,
            restarted: false,
            file_info: FileInfo {
                size_bytes: source.size_bytes,
                is_large_file: false,
                total_chunks: None,
                chunk_size_limit: None,
            },
        })
    }
}
