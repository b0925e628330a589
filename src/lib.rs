//! Resumable chunked ingestion of oversized files for AI consumers.
//!
//! `context-ingest` splits large files into line-aligned chunks, streams them
//! across calls behind persisted, content-hash-validated checkpoints, and
//! compresses files into relevance-ranked digests that fit a character
//! budget. Splitting and selection are deterministic: identical inputs always
//! produce identical outputs.

pub mod cache;
pub mod checkpoint;
pub mod document;
pub mod engine;
pub mod selection;
pub mod types;

pub use engine::{IngestConfig, IngestEngine, IngestError};
