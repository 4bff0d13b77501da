use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use arrow::array::cast::AsArray;
use arrow::array::{
    Array, ArrayRef, Float64Array, Int64Array, StringBuilder, TimestampMillisecondArray,
    UInt32Builder,
};
use arrow::compute::kernels::arity::unary;
use arrow::compute::{cast, take};
use arrow::datatypes::{Float64Type, TimestampMillisecondType};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use arrow_schema::{DataType, Field, Schema, SchemaRef, TimeUnit};
use tracing::{debug, warn};

use crate::config::PivotConflict;
use crate::error::{PricesError, Result};
use crate::types::{PriceUpdate, RunnerDescriptor, RunnerId};

pub const PUBLISH_TIME: &str = "publish_time";
pub const RUNNER_ID: &str = "runner_id";
pub const RUNNER_NAME: &str = "runner_name";
pub const LAST_TRADED_PROBABILITY: &str = "last_traded_probability";

fn ts_type() -> DataType {
    DataType::Timestamp(TimeUnit::Millisecond, None)
}

// ── Runner lookup ──

/// Runner definitions collapsed to one per id, first occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct RunnerIndex {
    runners: Vec<RunnerDescriptor>,
    by_id: HashMap<RunnerId, usize>,
}

impl RunnerIndex {
    pub fn dedup(runners: &[RunnerDescriptor]) -> Self {
        let mut index = RunnerIndex::default();
        for runner in runners {
            if !index.by_id.contains_key(&runner.id) {
                index.by_id.insert(runner.id, index.runners.len());
                index.runners.push(runner.clone());
            }
        }
        debug!(raw = runners.len(), unique = index.len(), "deduplicated runners");
        index
    }

    pub fn name(&self, id: RunnerId) -> Option<&str> {
        self.by_id.get(&id).map(|&i| self.runners[i].name.as_str())
    }

    /// Unique runners in first-seen order.
    pub fn runners(&self) -> &[RunnerDescriptor] {
        &self.runners
    }

    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }
}

pub fn runner_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(RUNNER_ID, DataType::Int64, false),
        Field::new(RUNNER_NAME, DataType::Utf8, false),
    ]))
}

/// The deduplicated runners as a two-column table.
pub fn runner_table(index: &RunnerIndex) -> Result<RecordBatch> {
    let ids = Int64Array::from_iter_values(index.runners().iter().map(|r| r.id.0));
    let mut names = StringBuilder::new();
    for runner in index.runners() {
        names.append_value(&runner.name);
    }
    let batch = RecordBatch::try_new(runner_schema(), vec![Arc::new(ids), Arc::new(names.finish())])?;
    Ok(batch)
}

// ── Long format ──

pub fn long_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(PUBLISH_TIME, ts_type(), false),
        Field::new(RUNNER_ID, DataType::Int64, false),
        Field::new(RUNNER_NAME, DataType::Utf8, false),
        Field::new(LAST_TRADED_PROBABILITY, DataType::Float64, true),
    ]))
}

/// One row per price update whose runner id is in `runners`, in update order.
///
/// Updates for unknown ids are dropped. Probability is `1 / ltp` with no
/// validation: zero gives infinity, a missing `ltp` gives null.
pub fn build_long(prices: &[PriceUpdate], runners: &RunnerIndex) -> Result<RecordBatch> {
    let ids = Int64Array::from_iter_values(prices.iter().map(|p| p.id.0));
    let ltp: Float64Array = prices.iter().map(|p| p.ltp).collect();
    let pt = Int64Array::from_iter_values(prices.iter().map(|p| p.pt));

    let probability: Float64Array = unary(&ltp, |v| 1.0 / v);
    let publish_time = cast(&pt, &ts_type())?;

    // inner join on id
    let mut matched = UInt32Builder::with_capacity(prices.len());
    let mut names = StringBuilder::new();
    for (row, price) in prices.iter().enumerate() {
        if let Some(name) = runners.name(price.id) {
            let row = u32::try_from(row)
                .map_err(|_| ArrowError::ComputeError("too many price updates".into()))?;
            matched.append_value(row);
            names.append_value(name);
        }
    }
    let matched = matched.finish();

    let dropped = prices.len() - matched.len();
    if dropped > 0 {
        warn!(dropped, "price updates without a runner definition dropped");
    }

    let columns: Vec<ArrayRef> = vec![
        take(publish_time.as_ref(), &matched, None)?,
        take(&ids, &matched, None)?,
        Arc::new(names.finish()),
        take(&probability, &matched, None)?,
    ];
    let batch = RecordBatch::try_new(long_schema(), columns)?;
    debug!(rows = batch.num_rows(), dropped, "built long price table");
    Ok(batch)
}

// ── Wide format ──

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| ArrowError::SchemaError(format!("missing column {name}")).into())
}

fn wrong_type(name: &str) -> PricesError {
    ArrowError::SchemaError(format!("column {name} has the wrong type")).into()
}

/// Pivot a long table to one row per publish time (ascending) and one column
/// per runner name (sorted), then forward-fill each runner column.
///
/// Two rows sharing a publish time and runner name are resolved by `on_conflict`.
pub fn build_wide(long: &RecordBatch, on_conflict: PivotConflict) -> Result<RecordBatch> {
    let times = column(long, PUBLISH_TIME)?
        .as_primitive_opt::<TimestampMillisecondType>()
        .ok_or_else(|| wrong_type(PUBLISH_TIME))?;
    let names = column(long, RUNNER_NAME)?
        .as_string_opt::<i32>()
        .ok_or_else(|| wrong_type(RUNNER_NAME))?;
    let probs = column(long, LAST_TRADED_PROBABILITY)?
        .as_primitive_opt::<Float64Type>()
        .ok_or_else(|| wrong_type(LAST_TRADED_PROBABILITY))?;

    let mut rows: BTreeMap<i64, usize> = times.values().iter().map(|&t| (t, 0)).collect();
    for (i, slot) in rows.values_mut().enumerate() {
        *slot = i;
    }
    let mut cols: BTreeMap<&str, usize> = names.iter().flatten().map(|n| (n, 0)).collect();
    if cols.contains_key(PUBLISH_TIME) {
        return Err(ArrowError::SchemaError(format!(
            "runner name {PUBLISH_TIME:?} collides with the time index column"
        ))
        .into());
    }
    for (i, slot) in cols.values_mut().enumerate() {
        *slot = i;
    }

    let mut cells: Vec<Vec<Option<f64>>> = vec![vec![None; rows.len()]; cols.len()];
    let mut seen: Vec<Vec<bool>> = vec![vec![false; rows.len()]; cols.len()];
    let mut conflicts = 0usize;

    for i in 0..long.num_rows() {
        let t = times.value(i);
        let name = names.value(i);
        let (r, c) = (rows[&t], cols[name]);
        if seen[c][r] {
            match on_conflict {
                PivotConflict::Reject => {
                    return Err(PricesError::DuplicateObservation {
                        publish_time: t,
                        runner_name: name.to_string(),
                    })
                }
                PivotConflict::KeepLast => conflicts += 1,
            }
        }
        seen[c][r] = true;
        // a null never replaces a real value at the same time
        if probs.is_valid(i) {
            cells[c][r] = Some(probs.value(i));
        }
    }

    if conflicts > 0 {
        warn!(conflicts, "duplicate (publish_time, runner) observations, kept the last");
    }

    let mut fields = vec![Field::new(PUBLISH_TIME, ts_type(), false)];
    let mut columns: Vec<ArrayRef> =
        vec![Arc::new(TimestampMillisecondArray::from_iter_values(rows.keys().copied()))];
    for (name, values) in cols.keys().zip(cells) {
        fields.push(Field::new(*name, DataType::Float64, true));
        columns.push(Arc::new(forward_fill(&Float64Array::from(values))));
    }

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
    debug!(rows = batch.num_rows(), runners = cols.len(), "built wide price table");
    Ok(batch)
}

/// Replace each null with the closest earlier non-null value. Leading nulls stay.
pub fn forward_fill(values: &Float64Array) -> Float64Array {
    let mut last = None;
    values
        .iter()
        .map(|v| {
            if v.is_some() {
                last = v;
            }
            last
        })
        .collect()
}
