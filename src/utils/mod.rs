//! Helpers for keeping host-side work off the hot path: call-rate limiting,
//! result caching, chunked processing and ad-hoc timing.

pub mod chunks;
pub mod memoize;
pub mod rate_limit;
pub mod timing;

pub use chunks::{chunk, process_in_chunks, DEFAULT_CHUNK_SIZE};
pub use memoize::Memoized;
pub use rate_limit::{Debouncer, Throttle};
pub use timing::{
    measure_time, measure_time_async, should_enable_feature, Profiled,
    SlowFrameDetector, LOW_MEMORY_LIMIT_MB,
};
