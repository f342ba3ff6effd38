use crate::source::DataSource;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use regex::Regex;
use stats_core::schema::schema_for_header;
use stats_core::{Result, StatsError};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

const BATCH_SIZE: usize = 8192;

/// Cell spellings read as missing, in any column
const NULL_VALUES: &str = r"^(|#N/A|#N/A N/A|#NA|-1\.#IND|-1\.#QNAN|-NaN|-nan|1\.#IND|1\.#QNAN|<NA>|N/A|NA|NULL|NaN|None|n/a|nan|null)$";

/// CSV file with a header row naming at least the required reading columns.
///
/// Timestamps may carry an offset; they are stored as naive UTC. Empty cells
/// and the usual spellings of "not available" load as nulls.
#[derive(Debug)]
pub struct CsvDataSource {
    schema: SchemaRef,
    path: PathBuf,
}

impl CsvDataSource {
    pub fn new(path: impl Into<PathBuf>, schema: SchemaRef) -> Self {
        Self {
            path: path.into(),
            schema,
        }
    }

    /// Open a CSV file, deriving the typed schema from its header row
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = File::open(&path)?;
        let (header, _) = Format::default()
            .with_header(true)
            .infer_schema(file, Some(0))?;
        let names: Vec<&str> = header.fields().iter().map(|f| f.name().as_str()).collect();
        let schema = schema_for_header(&names)?;
        Ok(Self::new(path, Arc::new(schema)))
    }
}

fn null_regex() -> Result<Regex> {
    Regex::new(NULL_VALUES)
        .map_err(|e| StatsError::SchemaError(format!("Invalid null pattern: {}", e)))
}

impl DataSource for CsvDataSource {
    fn scan(&self) -> Result<Vec<RecordBatch>> {
        let file = File::open(&self.path)?;

        let reader = ReaderBuilder::new(Arc::clone(&self.schema))
            .with_header(true)
            .with_batch_size(BATCH_SIZE)
            .with_null_regex(null_regex()?)
            .build(file)?;

        let batches: Result<Vec<_>> = reader
            .into_iter()
            .map(|batch| batch.map_err(|e| e.into()))
            .collect();

        batches
    }

    fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }
}
