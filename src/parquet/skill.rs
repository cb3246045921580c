//! Writes skill results as a long table of (group, lead, skill, samples).

use std::{collections::HashMap, path::Path, sync::Arc};

use anyhow::Result;
use arrow::{
    array::{ArrayRef, Float64Builder, RecordBatch, StringBuilder, UInt32Builder},
    datatypes::{DataType, Field, Schema},
};

use super::write_batch;
use crate::skill::SkillResult;

pub fn save_skill(result: &SkillResult, file_path: &Path) -> Result<()> {
    let lead_metadata = HashMap::from([("units".to_string(), result.lead_unit.to_string())]);
    let schema = Arc::new(Schema::new(vec![
        Field::new("group", DataType::Utf8, true),
        Field::new("lead", DataType::UInt32, false).with_metadata(lead_metadata),
        Field::new(result.metric.as_str(), DataType::Float64, true),
        Field::new("samples", DataType::UInt32, false),
    ]));

    let rows = result.rows.len() * result.leads.len();
    let mut group_builder = StringBuilder::with_capacity(rows, rows * 3);
    let mut lead_builder = UInt32Builder::with_capacity(rows);
    let mut value_builder = Float64Builder::with_capacity(rows);
    let mut samples_builder = UInt32Builder::with_capacity(rows);

    for row in &result.rows {
        for (lead, cell) in result.leads.iter().zip(&row.cells) {
            group_builder.append_option(row.group.as_deref());
            lead_builder.append_value(*lead);
            value_builder.append_option(cell.value.is_finite().then_some(cell.value));
            samples_builder.append_value(cell.samples as u32);
        }
    }

    let columns: Vec<ArrayRef> = vec![
        Arc::new(group_builder.finish()),
        Arc::new(lead_builder.finish()),
        Arc::new(value_builder.finish()),
        Arc::new(samples_builder.finish()),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns)?;

    write_batch(&batch, schema, file_path)
}

// -- Tests -------------------------------------------------------------------
