pub mod backend;
pub mod record;
pub mod store;

pub use backend::{CheckpointBackend, CheckpointSet, JsonFileBackend, MemoryBackend};
pub use record::{Checkpoint, Progress};
pub use store::{CheckpointStore, CheckpointStoreError, Freshness, SweepOutcome};
