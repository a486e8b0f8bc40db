pub mod freq_buckets;
pub mod ghost;
pub mod list;
pub mod shard;

pub use freq_buckets::FrequencyBuckets;
pub use ghost::GhostList;
pub use list::{NodeId, SentinelList};
pub use shard::ShardSelector;
