pub use crate::ds::{FrequencyBuckets, GhostList, NodeId, SentinelList, ShardSelector};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::policy::{ArcCache, LfuCache, LruCache, LruKCache, ShardedCache};
pub use crate::traits::CachePolicy;
