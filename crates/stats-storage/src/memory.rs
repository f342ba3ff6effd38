//! In-memory data source
//!
//! Mostly used to build small datasets for tests and demos without going
//! through a file.

use crate::source::DataSource;
use arrow::array::{ArrayRef, Float64Array, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use chrono::NaiveDateTime;
use stats_core::schema::{readings_schema, validate_schema};
use stats_core::Result;
use std::sync::Arc;

/// A single sensor reading
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub location: String,
    pub sensor: String,
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
}

impl Reading {
    pub fn new(
        location: impl Into<String>,
        sensor: impl Into<String>,
        timestamp: NaiveDateTime,
        value: f64,
    ) -> Self {
        Self {
            location: location.into(),
            sensor: sensor.into(),
            timestamp,
            value: Some(value),
        }
    }

    /// A reading whose value was not recorded
    pub fn missing(
        location: impl Into<String>,
        sensor: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            location: location.into(),
            sensor: sensor.into(),
            timestamp,
            value: None,
        }
    }
}

/// Data source backed by record batches already in memory
#[derive(Debug, Clone)]
pub struct MemoryDataSource {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl MemoryDataSource {
    /// Create a memory data source from batches matching `schema`
    pub fn new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Result<Self> {
        validate_schema(&schema)?;
        Ok(Self { schema, batches })
    }

    /// Build a single-batch source from readings, preserving their order
    pub fn from_readings(readings: &[Reading]) -> Result<Self> {
        let schema = Arc::new(readings_schema());

        let locations: StringArray = readings.iter().map(|r| Some(r.location.as_str())).collect();
        let sensors: StringArray = readings.iter().map(|r| Some(r.sensor.as_str())).collect();
        let timestamps = TimestampMicrosecondArray::from(
            readings
                .iter()
                .map(|r| r.timestamp.and_utc().timestamp_micros())
                .collect::<Vec<_>>(),
        );
        let values: Float64Array = readings.iter().map(|r| r.value).collect();

        let columns: Vec<ArrayRef> = vec![
            Arc::new(locations),
            Arc::new(sensors),
            Arc::new(timestamps),
            Arc::new(values),
        ];
        let batch = RecordBatch::try_new(Arc::clone(&schema), columns)?;

        Ok(Self {
            schema,
            batches: vec![batch],
        })
    }
}

impl DataSource for MemoryDataSource {
    fn scan(&self) -> Result<Vec<RecordBatch>> {
        Ok(self.batches.clone())
    }

    fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;
    use arrow::datatypes::{DataType, Field, Schema};

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_from_readings() {
        let source = MemoryDataSource::from_readings(&[
            Reading::new("A", "T", ts("2024-01-01 00:00:00"), 10.0),
            Reading::missing("A", "T", ts("2024-01-02 00:00:00")),
        ])
        .unwrap();

        let batches = source.scan().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].num_rows(), 2);
        assert_eq!(batches[0].column_by_name("value").unwrap().null_count(), 1);
    }

    #[test]
    fn test_empty_readings() {
        let source = MemoryDataSource::from_readings(&[]).unwrap();
        let batches = source.scan().unwrap();
        assert_eq!(batches[0].num_rows(), 0);
    }

    #[test]
    fn test_rejects_incomplete_schema() {
        let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, false)]));
        assert!(MemoryDataSource::new(schema, vec![]).is_err());
    }
}
