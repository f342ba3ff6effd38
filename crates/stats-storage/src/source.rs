use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use stats_core::Result;
use std::fmt::Debug;

/// Something that can produce the full set of readings as record batches
pub trait DataSource: Debug + Send + Sync {
    fn scan(&self) -> Result<Vec<RecordBatch>>;
    fn schema(&self) -> SchemaRef;
}
