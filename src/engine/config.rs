use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

// Key point:
// Serializable
// Every field defaulted, so a partial file is a valid config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub max_chunk_chars: usize,
    pub max_context_budget_chars: usize,
    pub large_file_threshold_bytes: u64,
    pub checkpoint_max_age_days: u32,
    pub checkpoint_file: PathBuf,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: 8000,
            max_context_budget_chars: 16000,
            large_file_threshold_bytes: 64 * 1024,
            checkpoint_max_age_days: 7,
            checkpoint_file: PathBuf::from("data/checkpoints.json"),
        }
    }
}

impl IngestConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path)?;
        let config: IngestConfig = serde_json::from_slice(&bytes)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_chunk_chars == 0 {
            return Err(ConfigError::Invalid("max_chunk_chars must be positive".into()));
        }
        Ok(())
    }
}
