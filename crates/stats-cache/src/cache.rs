//! LRU Query Cache implementation

use crate::config::CacheConfig;
use crate::stats::CacheStats;
use ahash::{AHashSet, RandomState};
use dashmap::DashMap;
use lru::LruCache;
use parking_lot::Mutex;
use stats_core::{CacheStatus, QueryParams, Result, StatsResult};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::debug;

/// Key for cache lookups: the four filter parameters, verbatim.
///
/// No trimming, case folding or date parsing is applied, so
/// `2024-01-02` and `2024-01-02T00:00:00` are different keys, and an absent
/// parameter never equals any string, including the empty one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    location: Option<String>,
    sensor: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

impl CacheKey {
    /// Derive the key for a query. Never fails.
    pub fn from_params(params: &QueryParams) -> Self {
        Self {
            location: params.location.clone(),
            sensor: params.sensor.clone(),
            start_date: params.start_date.clone(),
            end_date: params.end_date.clone(),
        }
    }

    /// Recover the query parameters this key was derived from
    pub fn to_params(&self) -> QueryParams {
        QueryParams {
            location: self.location.clone(),
            sensor: self.sensor.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
        }
    }
}

impl From<&QueryParams> for CacheKey {
    fn from(params: &QueryParams) -> Self {
        Self::from_params(params)
    }
}

impl From<QueryParams> for CacheKey {
    fn from(params: QueryParams) -> Self {
        Self {
            location: params.location,
            sensor: params.sensor,
            start_date: params.start_date,
            end_date: params.end_date,
        }
    }
}

/// Resident entries plus every key ever computed
struct CacheState {
    entries: LruCache<CacheKey, StatsResult, RandomState>,
    seen: AHashSet<CacheKey>,
}

/// Thread-safe LRU cache for stats query results
pub struct QueryCache {
    /// Entries and seen keys, guarded together so recency stays consistent
    state: Mutex<CacheState>,
    /// Per-key locks held while a key is being computed
    in_flight: DashMap<CacheKey, Arc<Mutex<()>>, RandomState>,
    /// Cache configuration
    config: CacheConfig,
    /// Cache statistics
    stats: Arc<CacheStats>,
}

impl QueryCache {
    /// Create a new query cache with the given configuration.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: Mutex::new(CacheState {
                entries: LruCache::with_hasher(capacity, RandomState::new()),
                seen: AHashSet::new(),
            }),
            in_flight: DashMap::with_hasher(RandomState::new()),
            config,
            stats: Arc::new(CacheStats::new()),
        }
    }

    /// Create a cache with default configuration
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    /// Check if caching is enabled
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Return the cached result for `key`, computing and storing it on a miss.
    ///
    /// `compute` runs at most once per call, and never while another caller
    /// is computing the same key. Errors from `compute` are returned as-is
    /// and leave no trace in the cache.
    pub fn lookup_or_compute<F>(
        &self,
        key: CacheKey,
        compute: F,
    ) -> Result<(StatsResult, CacheStatus)>
    where
        F: FnOnce(&CacheKey) -> Result<StatsResult>,
    {
        if !self.config.enabled {
            let result = self.run_compute(&key, compute)?;
            self.stats.record_miss();
            return Ok((result, CacheStatus::Miss));
        }

        if let Some(result) = self.get_resident(&key) {
            self.stats.record_hit();
            debug!(?key, "Cache hit");
            return Ok((result, CacheStatus::Hit));
        }

        let flight = Arc::clone(self.in_flight.entry(key.clone()).or_default().value());
        let outcome = {
            let _guard = flight.lock();

            // Another caller may have stored the key while we waited
            if let Some(result) = self.get_resident(&key) {
                Ok((result, CacheStatus::Hit))
            } else {
                self.run_compute(&key, compute).map(|result| {
                    let seen_before = self.insert(key.clone(), result);
                    (result, CacheStatus::from_hit(seen_before))
                })
            }
        };
        self.in_flight
            .remove_if(&key, |_, current| Arc::ptr_eq(current, &flight));

        let (result, status) = outcome?;
        match status {
            CacheStatus::Hit => self.stats.record_hit(),
            CacheStatus::Miss => self.stats.record_miss(),
        }
        debug!(?key, %status, "Cache lookup completed");
        Ok((result, status))
    }

    /// Get an entry from the cache, marking it most recently used
    pub fn get(&self, key: &CacheKey) -> Option<StatsResult> {
        if !self.config.enabled {
            return None;
        }

        let result = self.get_resident(key);
        match result {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        result
    }

    /// Look at an entry without touching its recency
    pub fn peek(&self, key: &CacheKey) -> Option<StatsResult> {
        self.state.lock().entries.peek(key).copied()
    }

    /// Check whether a key is resident, without touching its recency
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.state.lock().entries.contains(key)
    }

    /// Check whether a key has ever been computed successfully
    pub fn has_seen(&self, key: &CacheKey) -> bool {
        self.state.lock().seen.contains(key)
    }

    /// Insert an entry into the cache
    pub fn put(&self, key: CacheKey, result: StatsResult) {
        if !self.config.enabled {
            return;
        }
        self.insert(key, result);
    }

    /// Remove every entry and forget every seen key
    pub fn clear(&self) {
        let eviction_count = {
            let mut state = self.state.lock();
            let count = state.entries.len() as u64;
            state.entries.clear();
            state.seen.clear();
            count
        };

        // Record evictions after releasing the lock
        for _ in 0..eviction_count {
            self.stats.record_eviction();
        }

        self.stats.set_entry_count(0);
        self.stats.set_seen_count(0);
    }

    /// Get cache statistics
    pub fn stats(&self) -> Arc<CacheStats> {
        Arc::clone(&self.stats)
    }

    /// Get current number of entries
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Maximum number of resident entries
    pub fn capacity(&self) -> usize {
        self.state.lock().entries.cap().get()
    }

    /// Get the cache configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn get_resident(&self, key: &CacheKey) -> Option<StatsResult> {
        self.state.lock().entries.get(key).copied()
    }

    fn run_compute<F>(&self, key: &CacheKey, compute: F) -> Result<StatsResult>
    where
        F: FnOnce(&CacheKey) -> Result<StatsResult>,
    {
        match compute(key) {
            Ok(result) => {
                self.stats.record_computation();
                Ok(result)
            }
            Err(err) => {
                self.stats.record_failure();
                debug!(?key, error = %err, "Computation failed, nothing cached");
                Err(err)
            }
        }
    }

    /// Store a computed result. Returns whether the key had been seen before.
    fn insert(&self, key: CacheKey, result: StatsResult) -> bool {
        let (seen_before, evicted, entry_count, seen_count) = {
            let mut state = self.state.lock();
            let seen_before = if self.config.track_seen_keys {
                !state.seen.insert(key.clone())
            } else {
                false
            };

            // push hands back either the replaced value for this key or the evicted LRU entry
            let evicted = match state.entries.push(key.clone(), result) {
                Some((old_key, _)) if old_key != key => Some(old_key),
                _ => None,
            };
            (
                seen_before,
                evicted,
                state.entries.len() as u64,
                state.seen.len() as u64,
            )
        };

        if let Some(evicted_key) = evicted {
            self.stats.record_eviction();
            debug!(key = ?evicted_key, "Evicted least recently used entry");
        }
        self.stats.set_entry_count(entry_count);
        self.stats.set_seen_count(seen_count);
        seen_before
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("enabled", &self.config.enabled)
            .field("max_entries", &self.config.max_entries)
            .field("track_seen_keys", &self.config.track_seen_keys)
            .field("current_entries", &self.len())
            .finish()
    }
}
