use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::types::identifiers::ContentHash;

#[derive(Debug, Error)]
pub enum SourceFileError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Content of {0} is not valid UTF-8")]
    InvalidUtf8(PathBuf),
}

/// A file's text together with the fingerprint of exactly those bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub hash: ContentHash,
    pub size_bytes: u64,
    pub content: String,
}

impl SourceFile {
    /// Read `path` once, hashing and validating the same bytes.
    ///
    /// Hashing the buffer that gets split keeps the recorded fingerprint
    /// consistent with the chunks even if the file changes mid-call.
    pub fn load(path: &Path) -> Result<Self, SourceFileError> {
        let raw = std::fs::read(path).map_err(|source| SourceFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::ingest(path.to_path_buf(), raw)
    }

    pub fn ingest(path: PathBuf, raw_content: Vec<u8>) -> Result<Self, SourceFileError> {
        let hash = ContentHash::from_content(&raw_content);
        let size_bytes = raw_content.len() as u64;
        let content =
            String::from_utf8(raw_content).map_err(|_| SourceFileError::InvalidUtf8(path.clone()))?;

        Ok(SourceFile {
            path,
            hash,
            size_bytes,
            content,
        })
    }

    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}
