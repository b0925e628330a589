pub mod cache;
pub mod versioning;
pub mod invalidation;

pub use cache::ChunkCache;
pub use invalidation::{check_checkpoint, Invalidation};
pub use versioning::ChunkingKey;
