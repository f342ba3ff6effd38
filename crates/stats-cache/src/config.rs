//! Cache configuration options

use serde::{Deserialize, Serialize};

/// Default number of resident entries
pub const DEFAULT_MAX_ENTRIES: usize = 512;

/// Configuration for the query cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries in the cache
    pub max_entries: usize,
    /// Whether caching is enabled
    pub enabled: bool,
    /// Remember every computed key, so a key recomputed after eviction
    /// still reports a hit
    pub track_seen_keys: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            enabled: true,
            track_seen_keys: true,
        }
    }
}

impl CacheConfig {
    /// Create a new cache configuration with a custom capacity
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            ..Default::default()
        }
    }

    /// Create a disabled cache configuration
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Set the maximum number of entries
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Enable or disable the cache
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Enable or disable seen-key tracking
    pub fn with_track_seen_keys(mut self, track: bool) -> Self {
        self.track_seen_keys = track;
        self
    }
}
