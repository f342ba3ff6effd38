use crate::source::DataSource;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use stats_core::schema::validate_schema;
use stats_core::{Result, StatsError};
use std::time::Instant;
use tracing::info;

/// Immutable, fully materialized set of readings
#[derive(Debug, Clone)]
pub struct Dataset {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
    num_rows: usize,
}

impl Dataset {
    /// Load every batch from a data source.
    ///
    /// This is the only way data enters a dataset; there is no update path.
    pub fn load(source: &dyn DataSource) -> Result<Self> {
        let start = Instant::now();
        let dataset = Self::from_batches(source.schema(), source.scan()?)?;
        info!(
            rows = dataset.num_rows,
            batches = dataset.batches.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Dataset loaded"
        );
        Ok(dataset)
    }

    pub fn from_batches(schema: SchemaRef, batches: Vec<RecordBatch>) -> Result<Self> {
        validate_schema(&schema)?;
        if let Some(batch) = batches.iter().find(|b| b.schema() != schema) {
            return Err(StatsError::SchemaError(format!(
                "Batch schema {:?} does not match dataset schema",
                batch.schema()
            )));
        }
        let num_rows = batches.iter().map(|b| b.num_rows()).sum();
        Ok(Self {
            schema,
            batches,
            num_rows,
        })
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }
}
