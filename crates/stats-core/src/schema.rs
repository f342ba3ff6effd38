//! Column layout of the readings dataset

use crate::error::{Result, StatsError};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};

pub const LOCATION: &str = "location";
pub const SENSOR: &str = "sensor";
pub const TIMESTAMP: &str = "timestamp";
pub const VALUE: &str = "value";

/// Columns every dataset must provide
pub const REQUIRED_COLUMNS: [&str; 4] = [LOCATION, SENSOR, TIMESTAMP, VALUE];

/// Timestamps are naive UTC with microsecond resolution
pub fn timestamp_type() -> DataType {
    DataType::Timestamp(TimeUnit::Microsecond, None)
}

/// Arrow type a column is read as
pub fn column_data_type(name: &str) -> DataType {
    match name {
        LOCATION | SENSOR => DataType::Utf8,
        TIMESTAMP => timestamp_type(),
        VALUE => DataType::Float64,
        _ => DataType::Utf8,
    }
}

/// Schema of a dataset holding exactly the required columns
pub fn readings_schema() -> Schema {
    Schema::new(
        REQUIRED_COLUMNS
            .iter()
            .map(|name| Field::new(*name, column_data_type(name), true))
            .collect::<Vec<_>>(),
    )
}

/// Build a typed schema for the given header, keeping its column order.
///
/// Every column is nullable; unknown columns are carried as strings.
pub fn schema_for_header<S: AsRef<str>>(names: &[S]) -> Result<Schema> {
    validate_columns(names)?;
    let fields: Vec<Field> = names
        .iter()
        .map(|name| Field::new(name.as_ref(), column_data_type(name.as_ref()), true))
        .collect();
    Ok(Schema::new(fields))
}

/// Check that all required columns are present exactly once
pub fn validate_columns<S: AsRef<str>>(names: &[S]) -> Result<()> {
    for required in REQUIRED_COLUMNS {
        match names.iter().filter(|n| n.as_ref() == required).count() {
            0 => return Err(StatsError::ColumnNotFound(required.to_string())),
            1 => {}
            _ => {
                return Err(StatsError::SchemaError(format!(
                    "Duplicate column '{}'",
                    required
                )))
            }
        }
    }
    Ok(())
}

/// Check that an existing schema carries the required columns with the expected types
pub fn validate_schema(schema: &Schema) -> Result<()> {
    for required in REQUIRED_COLUMNS {
        let field = schema
            .field_with_name(required)
            .map_err(|_| StatsError::ColumnNotFound(required.to_string()))?;
        let expected = column_data_type(required);
        if field.data_type() != &expected {
            return Err(StatsError::SchemaError(format!(
                "Column '{}' has type {}, expected {}",
                required,
                field.data_type(),
                expected
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_for_header_keeps_order() {
        let schema = schema_for_header(&["timestamp", "location", "value", "sensor", "unit"]).unwrap();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, vec!["timestamp", "location", "value", "sensor", "unit"]);
        assert_eq!(schema.field(0).data_type(), &timestamp_type());
        assert_eq!(schema.field(2).data_type(), &DataType::Float64);
        assert_eq!(schema.field(4).data_type(), &DataType::Utf8);
        assert!(schema.fields().iter().all(|f| f.is_nullable()));
    }

    #[test]
    fn test_missing_column() {
        let err = schema_for_header(&["location", "sensor", "timestamp"]).unwrap_err();
        assert!(matches!(err, StatsError::ColumnNotFound(ref c) if c == "value"));
    }

    #[test]
    fn test_duplicate_column() {
        let err = validate_columns(&["location", "sensor", "timestamp", "value", "value"]).unwrap_err();
        assert!(matches!(err, StatsError::SchemaError(_)));
    }

    #[test]
    fn test_validate_schema_type_mismatch() {
        let schema = Schema::new(vec![
            Field::new(LOCATION, DataType::Utf8, false),
            Field::new(SENSOR, DataType::Utf8, false),
            Field::new(TIMESTAMP, DataType::Utf8, false),
            Field::new(VALUE, DataType::Float64, true),
        ]);
        assert!(matches!(
            validate_schema(&schema),
            Err(StatsError::SchemaError(_))
        ));
        assert!(validate_schema(&readings_schema()).is_ok());
    }
}
