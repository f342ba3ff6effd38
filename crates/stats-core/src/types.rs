use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw filter parameters of a stats query.
///
/// Every field is optional; an absent field applies no filter on that
/// dimension. Values are kept verbatim, including date strings, which are
/// only parsed when the query is aggregated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryParams {
    pub location: Option<String>,
    pub sensor: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_sensor(mut self, sensor: impl Into<String>) -> Self {
        self.sensor = Some(sensor.into());
        self
    }

    pub fn with_start_date(mut self, start_date: impl Into<String>) -> Self {
        self.start_date = Some(start_date.into());
        self
    }

    pub fn with_end_date(mut self, end_date: impl Into<String>) -> Self {
        self.end_date = Some(end_date.into());
        self
    }
}

/// Aggregate statistics over the `value` column of the matching rows.
///
/// `avg`, `min` and `max` are `None` exactly when `count` is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsResult {
    pub count: u64,
    pub avg: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl StatsResult {
    /// Result for a query that matched no values
    pub fn empty() -> Self {
        Self {
            count: 0,
            avg: None,
            min: None,
            max: None,
        }
    }

    /// Build a result from a non-null value count, their sum and extremes.
    ///
    /// A zero count always yields [`StatsResult::empty`].
    pub fn from_parts(count: u64, sum: f64, min: f64, max: f64) -> Self {
        if count == 0 {
            return Self::empty();
        }
        Self {
            count,
            avg: Some(sum / count as f64),
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl Default for StatsResult {
    fn default() -> Self {
        Self::empty()
    }
}

/// Whether a query result was served from cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn from_hit(hit: bool) -> Self {
        if hit {
            CacheStatus::Hit
        } else {
            CacheStatus::Miss
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, CacheStatus::Hit)
    }

    /// Value used for the `X-Cache` response header
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
