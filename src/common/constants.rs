/// The ratio of elements to slots above which the table grows.
pub(crate) const LOAD_FACTOR: f32 = 1.6;

/// The shrink threshold is `slots * LOAD_FACTOR / SHRINK_DIVISOR - SHRINK_OFFSET`.
pub(crate) const SHRINK_DIVISOR: f32 = 5.0;
pub(crate) const SHRINK_OFFSET: f32 = 8.0;

pub(crate) const DEFAULT_NUM_SHARDS: usize = 8;
pub(crate) const DEFAULT_INITIAL_CAPACITY: usize = 1;

/// How long a writer waits on a shard lock before backing off and retrying.
pub(crate) const WRITE_LOCK_TIMEOUT_MILLIS: u64 = 5;
