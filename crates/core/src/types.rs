/// Job ids are 1-based insertion sequence numbers.
pub type JobId = u64;

/// Durations and elapsed times are expressed in seconds.
pub type Seconds = f64;

/// Number of jobs dispatched together in one batch.
pub const BATCH_SIZE: usize = 4;
