use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),
}

impl StatsError {
    /// Whether this error was caused by caller input rather than the dataset
    pub fn is_client_error(&self) -> bool {
        matches!(self, StatsError::ParseError(_))
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;
