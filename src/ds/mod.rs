pub mod arena;
pub mod frequency_bucket;
pub mod shard;

pub use arena::{EntryArena, EntryHandle};
pub use frequency_bucket::{BucketIter, Entry, FrequencyBucket};
pub use shard::ShardSelector;
