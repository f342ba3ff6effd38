pub mod aggregate;
pub mod cached_engine;

pub use aggregate::{aggregate, RowFilter};
pub use cached_engine::CachedStatsEngine;
