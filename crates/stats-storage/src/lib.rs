//! Dataset store for sensor readings
//!
//! A [`Dataset`] is loaded once from a [`DataSource`] and is immutable
//! afterwards, so it can be shared across threads without locking.

pub mod csv;
pub mod dataset;
pub mod memory;
pub mod source;

pub use csv::CsvDataSource;
pub use dataset::Dataset;
pub use memory::{MemoryDataSource, Reading};
pub use source::DataSource;
