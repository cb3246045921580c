//! Reads and writes observation series.

use std::{path::Path, sync::Arc};

use anyhow::Result;
use arrow::{
    array::{ArrayRef, Date32Array, Float64Array, RecordBatch},
    datatypes::{DataType, Field, Schema},
};

use super::{
    columns::{date_values, f64_values},
    read_batches, write_batch, ReadOptions,
};
use crate::{calendar::to_date32, data::ObservationSeries};

/// Reads the `time` and `value` columns, under the names given by
/// `options.columns`. Rows may come in any order.
pub fn read_observation(file_path: &Path, options: &ReadOptions) -> Result<ObservationSeries> {
    let names = &options.columns;
    let mut rows = Vec::new();

    for batch in read_batches(file_path)? {
        let times = date_values(&batch, &names.time, options.calendar)?;
        let values = f64_values(&batch, &names.value)?;
        rows.extend(times.into_iter().zip(values));
    }

    Ok(ObservationSeries::from_unsorted(rows)?)
}

pub fn save_observation(series: &ObservationSeries, file_path: &Path) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("time", DataType::Date32, false),
        Field::new("value", DataType::Float64, true),
    ]));

    let times = Date32Array::from(series.times().iter().map(|d| to_date32(*d)).collect::<Vec<_>>());
    let values = Float64Array::from(
        series
            .values()
            .iter()
            .map(|v| v.is_finite().then_some(*v))
            .collect::<Vec<_>>(),
    );

    let columns: Vec<ArrayRef> = vec![Arc::new(times), Arc::new(values)];
    let batch = RecordBatch::try_new(schema.clone(), columns)?;

    write_batch(&batch, schema, file_path)
}

// -- Tests -------------------------------------------------------------------
