//! Reads a long-format forecast table.

use std::path::Path;

use anyhow::{anyhow, Result};

use super::{
    columns::{attribute, date_values, f64_values, i64_values},
    read_batches, ReadOptions,
};
use crate::{
    data::{ForecastEnsemble, ForecastRecord},
    lead::LeadUnit,
};

#[derive(Debug, Clone, Default)]
pub struct ForecastTable {
    pub records: Vec<ForecastRecord>,
    /// Unit named by the `units` attribute of the lead column.
    pub lead_unit: Option<LeadUnit>,
}

impl ForecastTable {
    pub fn into_ensemble(self, lead_unit: LeadUnit) -> Result<ForecastEnsemble> {
        Ok(ForecastEnsemble::from_records(&self.records, lead_unit)?)
    }
}

/// Reads `init`, `lead`, optional `member` and `value` columns, under the
/// names given by `options.columns`.
pub fn read_forecast(file_path: &Path, options: &ReadOptions) -> Result<ForecastTable> {
    let names = &options.columns;
    let mut table = ForecastTable::default();

    for batch in read_batches(file_path)? {
        if let Some(units) = attribute(&batch, &names.lead, "units") {
            table.lead_unit = Some(units.parse()?);
        }

        let inits = date_values(&batch, &names.init, options.calendar)?;
        let leads = i64_values(&batch, &names.lead)?;
        let values = f64_values(&batch, &names.value)?;
        let members = match batch.column_by_name(&names.member) {
            Some(_) => i64_values(&batch, &names.member)?,
            None => vec![0; batch.num_rows()],
        };

        for (((init, lead), member), value) in inits.into_iter().zip(leads).zip(members).zip(values)
        {
            let lead = u32::try_from(lead)
                .map_err(|_| anyhow!("Lead offset {} is not a non-negative integer", lead))?;

            table.records.push(ForecastRecord {
                init,
                lead,
                member,
                value,
            });
        }
    }

    Ok(table)
}

// -- Tests -------------------------------------------------------------------
