pub mod datetime;
pub mod error;
pub mod schema;
pub mod types;

pub use datetime::parse_datetime;
pub use error::{Result, StatsError};
pub use types::*;
