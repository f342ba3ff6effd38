//! LRU Query Result Cache for stats queries
//!
//! This crate memoizes [`StatsResult`](stats_core::StatsResult)s keyed by the
//! exact filter parameters of a query.
//!
//! # Features
//!
//! - **LRU Eviction**: Least recently used entries are evicted when capacity is reached
//! - **At-most-once computation**: Concurrent misses on one key compute it once
//! - **Seen-key tracking**: Keys computed before an eviction keep reporting `HIT`
//! - **Statistics**: Track hits, misses, evictions, computations and failures
//!
//! # Example
//!
//! ```ignore
//! use stats_cache::{CacheConfig, CacheKey, QueryCache};
//!
//! let cache = QueryCache::new(CacheConfig::default());
//! let key = CacheKey::from_params(&params);
//!
//! let (stats, status) = cache.lookup_or_compute(key, |key| engine.compute(key))?;
//! response.insert_header("X-Cache", status.as_str());
//! ```

pub mod cache;
pub mod config;
pub mod stats;

pub use cache::{CacheKey, QueryCache};
pub use config::CacheConfig;
pub use stats::{CacheStats, CacheStatsSnapshot};
