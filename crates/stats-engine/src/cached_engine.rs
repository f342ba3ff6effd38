//! Cached Stats Engine
//!
//! Wraps the aggregation over a dataset with an LRU cache keyed by the raw
//! query parameters.

use crate::aggregate::aggregate;
use stats_cache::{CacheConfig, CacheKey, CacheStats, QueryCache};
use stats_core::{CacheStatus, QueryParams, Result, StatsResult};
use stats_storage::Dataset;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// A stats engine with built-in caching support
#[derive(Debug)]
pub struct CachedStatsEngine {
    /// The immutable dataset queries run against
    dataset: Arc<Dataset>,
    /// The query cache
    cache: Arc<QueryCache>,
}

impl CachedStatsEngine {
    /// Create a new cached engine with the given cache configuration
    pub fn new(dataset: Arc<Dataset>, config: CacheConfig) -> Self {
        Self {
            dataset,
            cache: Arc::new(QueryCache::new(config)),
        }
    }

    /// Create a cached engine with default configuration
    pub fn with_defaults(dataset: Arc<Dataset>) -> Self {
        Self::new(dataset, CacheConfig::default())
    }

    /// Create a cached engine with a shared cache
    pub fn with_cache(dataset: Arc<Dataset>, cache: Arc<QueryCache>) -> Self {
        Self { dataset, cache }
    }

    /// Answer a query, reporting whether it was served from cache.
    ///
    /// Invalid dates fail with a parse error and are never cached.
    pub fn query(&self, params: &QueryParams) -> Result<(StatsResult, CacheStatus)> {
        let cache_key = CacheKey::from_params(params);
        let dataset = &self.dataset;

        self.cache.lookup_or_compute(cache_key, |key| {
            let start = Instant::now();
            let result = aggregate(&key.to_params(), dataset)?;
            debug!(
                count = result.count,
                rows = dataset.num_rows(),
                elapsed_us = start.elapsed().as_micros() as u64,
                "Computed stats"
            );
            Ok(result)
        })
    }

    /// Compute without caching (bypass cache)
    pub fn query_uncached(&self, params: &QueryParams) -> Result<StatsResult> {
        aggregate(params, &self.dataset)
    }

    /// Get cache statistics
    pub fn cache_stats(&self) -> Arc<CacheStats> {
        self.cache.stats()
    }

    /// Get the underlying cache
    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// Get the dataset
    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    /// Clear all cached entries
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Check if caching is enabled
    pub fn is_cache_enabled(&self) -> bool {
        self.cache.is_enabled()
    }

    /// Get the number of cached entries
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
