//! Reads input tables from and writes results to the _parquet_ file format.

pub mod columns;
pub mod forecast;
pub mod observation;
pub mod skill;

use std::{fs::File, path::Path, sync::Arc};

use anyhow::{Context, Result};
use arrow::{array::RecordBatch, datatypes::Schema};
use ::parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter},
    basic::Compression,
    file::properties::WriterProperties,
};

use crate::{calendar::Calendar, config::ColumnNames};

pub use forecast::{read_forecast, ForecastTable};
pub use observation::{read_observation, save_observation};
pub use skill::save_skill;

#[derive(Debug, Clone, Default)]
/// How input tables are interpreted.
pub struct ReadOptions {
    pub columns: ColumnNames,
    /// Calendar of numeric time columns without a `calendar` attribute.
    pub calendar: Calendar,
}

/// Loads every record batch of a parquet file.
fn read_batches(file_path: &Path) -> Result<Vec<RecordBatch>> {
    let file = File::open(file_path)
        .with_context(|| format!("Failed to open `{}`", file_path.display()))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let batches = reader.collect::<Result<Vec<_>, _>>()?;

    Ok(batches)
}

pub(crate) fn write_batch(batch: &RecordBatch, schema: Arc<Schema>, file_path: &Path) -> Result<()> {
    let file = File::create(file_path)
        .with_context(|| format!("Failed to create `{}`", file_path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    writer.write(batch)?;
    writer.close()?;

    Ok(())
}
