use std::path::PathBuf;

use thiserror::Error;

use crate::checkpoint::CheckpointStoreError;
use crate::document::SourceFileError;
use crate::engine::config::ConfigError;

pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Content of {0} is not valid UTF-8")]
    InvalidUtf8(PathBuf),

    #[error("No more content in {0}; reset to read it again")]
    NoMoreContent(PathBuf),

    #[error("Checkpoint store error: {0}")]
    Store(CheckpointStoreError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl IngestError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            IngestError::NotFound(path.to_path_buf())
        } else {
            IngestError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

impl From<SourceFileError> for IngestError {
    fn from(err: SourceFileError) -> Self {
        match err {
            SourceFileError::Io { path, source } => IngestError::io(&path, source),
            SourceFileError::InvalidUtf8(path) => IngestError::InvalidUtf8(path),
        }
    }
}

// File errors raised inside the store keep their own variants.
impl From<CheckpointStoreError> for IngestError {
    fn from(err: CheckpointStoreError) -> Self {
        match err {
            CheckpointStoreError::Source(source) => source.into(),
            other => IngestError::Store(other),
        }
    }
}
