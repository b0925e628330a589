pub mod chunk;
pub mod document;
pub mod fingerprint;
pub mod splitter;

pub use crate::types::identifiers::{ContentHash, TrackedPath};
pub use chunk::Chunk;
pub use document::{SourceFile, SourceFileError};
pub use fingerprint::fingerprint;
pub use splitter::split;
