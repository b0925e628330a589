use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Absolute, UTF-8 path used as the unique key of a checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackedPath(String);

#[derive(Debug, Error)]
pub enum TrackedPathError {
    #[error("Path involves invalid UTF-8")]
    InvalidUtf8,
    #[error("Cannot resolve working directory: {0}")]
    WorkingDir(#[from] std::io::Error),
}

impl TrackedPath {
    /// Resolve `path` to its absolute form.
    ///
    /// Existing files are canonicalized so that symlinks and `..` segments
    /// collapse onto one key. Paths that no longer exist (a deleted file being
    /// reset) are made absolute against the working directory instead.
    pub fn resolve(path: &Path) -> Result<Self, TrackedPathError> {
        let absolute = match std::fs::canonicalize(path) {
            Ok(p) => p,
            Err(_) if path.is_absolute() => path.to_path_buf(),
            Err(_) => std::env::current_dir()?.join(path),
        };

        let s = absolute.to_str().ok_or(TrackedPathError::InvalidUtf8)?;
        Ok(TrackedPath(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content fingerprint, `sha256:<hex>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn from_content(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        Self::from_hasher(hasher)
    }

    pub(crate) fn from_hasher(hasher: Sha256) -> Self {
        let hash = hasher.finalize();
        let hex = hex::encode(hash);

        ContentHash(format!("sha256:{hex}"))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
