//! Time-bounded lookup cache for Depot.
//!
//! Generic per-key memoization of external fetches with a freshness window,
//! single-flight refresh, fetch timeouts, optional LRU bound, and an
//! injectable clock.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cache;
mod clock;

pub use cache::{
    CacheConfig, CacheEntry, CacheLookup, CacheStats, ConcurrentRefreshPolicy, LookupSource,
    RefreshFailurePolicy, TimedLookupCache,
};
pub use clock::{Clock, ManualClock, SystemClock};
