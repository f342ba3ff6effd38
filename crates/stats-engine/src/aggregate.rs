//! Filter-and-aggregate over the readings dataset

use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float64Array, StringArray, TimestampMicrosecondArray,
};
use arrow::datatypes::Float64Type;
use arrow::compute::{self, kernels::cmp};
use arrow::record_batch::RecordBatch;
use stats_core::datetime::parse_bound_micros;
use stats_core::schema::{LOCATION, SENSOR, TIMESTAMP, VALUE};
use stats_core::{QueryParams, Result, StatsError, StatsResult};
use stats_storage::Dataset;
use std::sync::Arc;

/// Row predicates of a query, with date bounds already parsed.
///
/// Empty strings apply no filter, the same as absent parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowFilter {
    pub location: Option<String>,
    pub sensor: Option<String>,
    /// Inclusive lower bound, microseconds since the epoch
    pub start_micros: Option<i64>,
    /// Inclusive upper bound, microseconds since the epoch
    pub end_micros: Option<i64>,
}

impl RowFilter {
    /// Build a filter from raw parameters. Fails on an unparseable date.
    pub fn try_from_params(params: &QueryParams) -> Result<Self> {
        Ok(Self {
            location: non_empty(&params.location).map(str::to_string),
            sensor: non_empty(&params.sensor).map(str::to_string),
            start_micros: non_empty(&params.start_date)
                .map(|s| parse_bound_micros("start_date", s))
                .transpose()?,
            end_micros: non_empty(&params.end_date)
                .map(|s| parse_bound_micros("end_date", s))
                .transpose()?,
        })
    }

    /// Return the `value` column of the rows in `batch` that pass the filter
    pub fn apply(&self, batch: &RecordBatch) -> Result<Float64Array> {
        let mut mask: Option<BooleanArray> = None;

        if let Some(location) = &self.location {
            let matches = cmp::eq(column(batch, LOCATION)?, &StringArray::new_scalar(location))?;
            mask = Some(combine(mask, matches)?);
        }

        if let Some(sensor) = &self.sensor {
            let matches = cmp::eq(column(batch, SENSOR)?, &StringArray::new_scalar(sensor))?;
            mask = Some(combine(mask, matches)?);
        }

        if let Some(start) = self.start_micros {
            let matches = cmp::gt_eq(
                column(batch, TIMESTAMP)?,
                &TimestampMicrosecondArray::new_scalar(start),
            )?;
            mask = Some(combine(mask, matches)?);
        }

        if let Some(end) = self.end_micros {
            let matches = cmp::lt_eq(
                column(batch, TIMESTAMP)?,
                &TimestampMicrosecondArray::new_scalar(end),
            )?;
            mask = Some(combine(mask, matches)?);
        }

        let values = column(batch, VALUE)?;
        let retained = match mask {
            Some(mask) => compute::filter(values.as_ref(), &mask)?,
            None => Arc::clone(values),
        };

        retained
            .as_any()
            .downcast_ref::<Float64Array>()
            .cloned()
            .ok_or_else(|| {
                StatsError::SchemaError(format!(
                    "Column '{}' is {}, expected Float64",
                    VALUE,
                    retained.data_type()
                ))
            })
    }
}

/// Running count, sum and extremes of non-null, non-NaN values
#[derive(Debug, Default)]
struct Accumulator {
    count: u64,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl Accumulator {
    fn update(&mut self, values: &Float64Array) -> Result<()> {
        // NaN counts as missing
        let not_nan = BooleanArray::from_unary(values, |v| !v.is_nan());
        let retained = compute::filter(values, &not_nan)?;
        self.add(retained.as_primitive::<Float64Type>());
        Ok(())
    }

    fn add(&mut self, values: &Float64Array) {
        let non_null = values.len() - values.null_count();
        if non_null == 0 {
            return;
        }
        self.count += non_null as u64;
        self.sum += compute::sum(values).unwrap_or(0.0);
        self.min = merge(self.min, compute::min(values), f64::min);
        self.max = merge(self.max, compute::max(values), f64::max);
    }

    fn finish(self) -> StatsResult {
        match (self.min, self.max) {
            (Some(min), Some(max)) => StatsResult::from_parts(self.count, self.sum, min, max),
            _ => StatsResult::empty(),
        }
    }
}

/// Compute count, average, min and max of `value` over the rows matching `params`.
///
/// Null and NaN values are ignored. Rows with a null location, sensor or
/// timestamp only match when that field is not filtered on. Date bounds are
/// parsed before any row is read, so an invalid date fails even against an
/// empty dataset.
pub fn aggregate(params: &QueryParams, dataset: &Dataset) -> Result<StatsResult> {
    let filter = RowFilter::try_from_params(params)?;

    let mut acc = Accumulator::default();
    for batch in dataset.batches() {
        acc.update(&filter.apply(batch)?)?;
    }
    Ok(acc.finish())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| StatsError::ColumnNotFound(name.to_string()))
}

fn combine(mask: Option<BooleanArray>, next: BooleanArray) -> Result<BooleanArray> {
    match mask {
        Some(mask) => Ok(compute::and(&mask, &next)?),
        None => Ok(next),
    }
}

fn merge(current: Option<f64>, next: Option<f64>, pick: fn(f64, f64) -> f64) -> Option<f64> {
    match (current, next) {
        (Some(a), Some(b)) => Some(pick(a, b)),
        (a, b) => a.or(b),
    }
}
