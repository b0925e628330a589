use std::fs;

use context_ingest::engine::ConfigError;
use context_ingest::{IngestConfig, IngestEngine, IngestError};
use tempfile::tempdir;

#[test]
fn defaults_match_documented_values() {
    let config = IngestConfig::default();

    assert_eq!(config.max_chunk_chars, 8000);
    assert_eq!(config.max_context_budget_chars, 16000);
    assert_eq!(config.large_file_threshold_bytes, 65536);
    assert_eq!(config.checkpoint_max_age_days, 7);
}

#[test]
fn partial_config_file_keeps_other_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ingest.json");
    fs::write(&path, r#"{ "max_chunk_chars": 4000, "checkpoint_max_age_days": 1 }"#).unwrap();

    let config = IngestConfig::from_json_file(&path).unwrap();

    assert_eq!(config.max_chunk_chars, 4000);
    assert_eq!(config.checkpoint_max_age_days, 1);
    assert_eq!(config.large_file_threshold_bytes, 65536);
}

#[test]
fn zero_chunk_size_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ingest.json");
    fs::write(&path, r#"{ "max_chunk_chars": 0 }"#).unwrap();

    assert!(matches!(IngestConfig::from_json_file(&path), Err(ConfigError::Invalid(_))));

    let config = IngestConfig {
        max_chunk_chars: 0,
        ..IngestConfig::default()
    };
    assert!(matches!(
        IngestEngine::in_memory(config),
        Err(IngestError::Config(ConfigError::Invalid(_)))
    ));
}

#[test]
fn malformed_config_is_a_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ingest.json");
    fs::write(&path, "max_chunk_chars = 3").unwrap();

    assert!(matches!(IngestConfig::from_json_file(&path), Err(ConfigError::Parse(_))));
}

#[test]
fn large_file_threshold_is_strict() {
    let dir = tempdir().unwrap();
    let at = dir.path().join("at.txt");
    let over = dir.path().join("over.txt");
    fs::write(&at, "a".repeat(65536)).unwrap();
    fs::write(&over, "a".repeat(65537)).unwrap();
    let engine = IngestEngine::in_memory(IngestConfig::default()).unwrap();

    assert!(!engine.is_large_file(&at));
    assert!(engine.is_large_file(&over));
    assert!(!engine.is_large_file(&dir.path().join("missing.txt")));
}
