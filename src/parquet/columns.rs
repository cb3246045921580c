//! Typed access to record batch columns.

use anyhow::{anyhow, bail, Result};
use arrow::{
    array::{Array, ArrayRef, Date32Array, Float64Array, Int64Array, RecordBatch},
    compute::cast,
    datatypes::DataType,
};
use chrono::NaiveDate;

use crate::calendar::{from_date32, Calendar, CfTime};

pub fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| anyhow!("Column `{}` not found", name))
}

/// Field metadata entry of a column, e.g. its `units`.
pub fn attribute(batch: &RecordBatch, name: &str, key: &str) -> Option<String> {
    batch
        .schema()
        .field_with_name(name)
        .ok()
        .and_then(|field| field.metadata().get(key).cloned())
}

/// Values as `f64`, nulls as NaN.
pub fn f64_values(batch: &RecordBatch, name: &str) -> Result<Vec<f64>> {
    let array = cast(column(batch, name)?, &DataType::Float64)?;
    let array = array
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| anyhow!("Column `{}` is not numeric", name))?;

    Ok(array
        .iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

/// Integer values. Nulls are an error.
pub fn i64_values(batch: &RecordBatch, name: &str) -> Result<Vec<i64>> {
    let array = cast(column(batch, name)?, &DataType::Int64)?;
    let array = array
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| anyhow!("Column `{}` is not an integer column", name))?;

    array
        .iter()
        .map(|v| v.ok_or_else(|| anyhow!("Column `{}` contains nulls", name)))
        .collect()
}

/// Dates of a time column.
///
/// Date and timestamp columns are truncated to the day. Numeric columns are
/// decoded from their `units` and `calendar` attributes, `default_calendar`
/// standing in for a missing `calendar`.
pub fn date_values(
    batch: &RecordBatch,
    name: &str,
    default_calendar: Calendar,
) -> Result<Vec<NaiveDate>> {
    let array = column(batch, name)?;

    match array.data_type() {
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            let dates = cast(array, &DataType::Date32)?;
            let dates = dates
                .as_any()
                .downcast_ref::<Date32Array>()
                .ok_or_else(|| anyhow!("Column `{}` could not be read as dates", name))?;

            dates
                .iter()
                .map(|v| -> Result<NaiveDate> {
                    let v = v.ok_or_else(|| anyhow!("Column `{}` contains nulls", name))?;
                    Ok(from_date32(v)?)
                })
                .collect()
        }
        data_type if data_type.is_numeric() => {
            let Some(units) = attribute(batch, name, "units") else {
                bail!("Numeric time column `{}` has no `units` attribute", name);
            };
            let calendar = match attribute(batch, name, "calendar") {
                Some(attr) => Calendar::from_cf_attr(&attr)?,
                None => default_calendar,
            };
            let cf = CfTime::parse(&units, calendar)?;

            Ok(cf.decode_all(&f64_values(batch, name)?)?)
        }
        other => bail!("Column `{}` has unsupported time type {}", name, other),
    }
}

// -- Tests -------------------------------------------------------------------
