use std::path::Path;

use anyhow::{bail, Result};
use tracing::{info, warn};

use crate::{
    cli::{clear_on_error, create_progress_bar, create_spinner, ScoreArgs},
    config::{FileConfig, SkillConfig},
    data::ObservationSeries,
    lead::LeadUnit,
    parquet::{self, ForecastTable, ReadOptions},
    skill::SkillEvaluator,
};

use super::{make_parquet_file_name, read_options};

pub async fn score(args: &ScoreArgs, config_path: Option<&Path>) -> Result<String> {
    let file_config = FileConfig::discover(config_path)?;
    let options = read_options(&file_config)?;

    let bar = create_spinner("Loading forecast and observations...".to_string());
    let loaded = load_inputs(&args.forecast, &args.observation, options).await;
    let (table, observation) = clear_on_error(&bar, loaded)?;
    bar.finish_with_message(format!(
        "Loaded {} forecast values and {} observations",
        table.records.len(),
        observation.len()
    ));

    let lead_unit = resolve_lead_unit(args.lead_unit, file_config.lead_unit, table.lead_unit)?;
    let config = SkillConfig::new(lead_unit)
        .with_grouping(args.grouping.or(file_config.grouping))
        .with_members(args.members.or(file_config.members).unwrap_or_default())
        .with_metric(args.metric.or(file_config.metric).unwrap_or_default());
    info!(?config, "Scoring configuration");

    let forecast = table.into_ensemble(lead_unit)?;
    let evaluator = SkillEvaluator::new(config);

    let pb = create_progress_bar(
        evaluator.cell_count(&forecast) as u64,
        "Scoring leads".to_string(),
    );
    let result = evaluator.compute_skill_with(&forecast, &observation, || pb.inc(1));
    let result = clear_on_error(&pb, result)?;
    pb.finish_with_message("Skill computed");

    println!("{}", result);

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| make_parquet_file_name(result.metric.as_str()));
    parquet::save_skill(&result, &output)?;

    Ok(output.to_string_lossy().to_string())
}

/// Reads both tables on blocking tasks at the same time.
async fn load_inputs(
    forecast_path: &Path,
    observation_path: &Path,
    options: ReadOptions,
) -> Result<(ForecastTable, ObservationSeries)> {
    let forecast_path = forecast_path.to_path_buf();
    let observation_path = observation_path.to_path_buf();
    let forecast_options = options.clone();

    let forecast = tokio::task::spawn_blocking(move || {
        parquet::read_forecast(&forecast_path, &forecast_options)
    });
    let observation = tokio::task::spawn_blocking(move || {
        parquet::read_observation(&observation_path, &options)
    });

    let (forecast, observation) = futures::future::try_join(forecast, observation).await?;

    Ok((forecast?, observation?))
}

/// Command line, then config file, then the lead column's `units` attribute.
fn resolve_lead_unit(
    from_args: Option<LeadUnit>,
    from_config: Option<LeadUnit>,
    from_table: Option<LeadUnit>,
) -> Result<LeadUnit> {
    let Some(unit) = from_args.or(from_config).or(from_table) else {
        bail!(
            "No lead unit given: pass --lead-unit, set `lead_unit` in the config file \
             or add a `units` attribute to the lead column"
        );
    };

    if let Some(declared) = from_table {
        if declared != unit {
            warn!(%declared, %unit, "Lead column units overridden");
        }
    }

    Ok(unit)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {

    use std::{
        collections::{BTreeSet, HashMap},
        fs::File,
        sync::Arc,
    };

    use ::parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use arrow::{
        array::{
            Array, ArrayRef, Date32Array, Float64Array, Int32Array, RecordBatch, StringArray,
            UInt32Array,
        },
        datatypes::{DataType, Field, Schema},
    };
    use chrono::{Days, NaiveDate};
    use tempfile::TempDir;

    use super::*;
    use crate::{calendar::to_date32, config::Grouping, parquet::save_observation};

    #[test]
    fn should_resolve_lead_unit_in_order() {
        let unit = resolve_lead_unit(Some(LeadUnit::Days), Some(LeadUnit::Months), None).unwrap();
        assert_eq!(unit, LeadUnit::Days);

        let unit = resolve_lead_unit(None, Some(LeadUnit::Months), Some(LeadUnit::Days)).unwrap();
        assert_eq!(unit, LeadUnit::Months);

        let unit = resolve_lead_unit(None, None, Some(LeadUnit::Weeks)).unwrap();
        assert_eq!(unit, LeadUnit::Weeks);

        assert!(resolve_lead_unit(None, None, None).is_err());
    }

    fn write_forecast(path: &Path, start: NaiveDate, inits: u64, leads: i32, obs: &[f64]) {
        let lead_meta = HashMap::from([("units".to_string(), "days".to_string())]);
        let schema = Arc::new(Schema::new(vec![
            Field::new("init", DataType::Date32, false),
            Field::new("lead", DataType::Int32, false).with_metadata(lead_meta),
            Field::new("value", DataType::Float64, true),
        ]));

        let mut init_col = Vec::new();
        let mut lead_col = Vec::new();
        let mut value_col = Vec::new();
        for i in 0..inits {
            for lead in 0..leads {
                init_col.push(to_date32(start + Days::new(i)));
                lead_col.push(lead);
                value_col.push(obs[i as usize + lead as usize]);
            }
        }

        let columns: Vec<ArrayRef> = vec![
            Arc::new(Date32Array::from(init_col)),
            Arc::new(Int32Array::from(lead_col)),
            Arc::new(Float64Array::from(value_col)),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
        crate::parquet::write_batch(&batch, schema, path).unwrap();
    }

    #[tokio::test]
    async fn should_score_files_end_to_end() {
        let dir = TempDir::new().unwrap();
        let start = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        let values: Vec<f64> = (0..40).map(|i| (i as f64 * 0.3).cos()).collect();

        let observation_path = dir.path().join("obs.parquet");
        let times = (0..40).map(|i| start + Days::new(i)).collect();
        let series = ObservationSeries::new(times, values.clone()).unwrap();
        save_observation(&series, &observation_path).unwrap();

        let forecast_path = dir.path().join("fc.parquet");
        write_forecast(&forecast_path, start, 30, 3, &values);

        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "").unwrap();

        let output = dir.path().join("skill.parquet");
        let args = ScoreArgs {
            forecast: forecast_path,
            observation: observation_path,
            lead_unit: None,
            grouping: Some(Grouping::InitMonth),
            members: None,
            metric: None,
            output: Some(output.clone()),
        };

        let saved = score(&args, Some(&config_path)).await.unwrap();

        assert_eq!(saved, output.to_string_lossy());

        let file = File::open(&output).unwrap();
        let batches: Vec<RecordBatch> = ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        let batch = &batches[0];
        assert_eq!(batch.num_rows(), 12 * 3);

        let groups = batch
            .column_by_name("group")
            .and_then(|c| c.as_any().downcast_ref::<StringArray>())
            .unwrap();
        let acc = batch
            .column_by_name("acc")
            .and_then(|c| c.as_any().downcast_ref::<Float64Array>())
            .unwrap();
        let samples = batch
            .column_by_name("samples")
            .and_then(|c| c.as_any().downcast_ref::<UInt32Array>())
            .unwrap();

        let labels: BTreeSet<&str> = (0..batch.num_rows()).map(|i| groups.value(i)).collect();
        assert_eq!(labels.len(), 12);

        let mut scored = 0;
        for i in 0..batch.num_rows() {
            if samples.value(i) >= 2 {
                assert_eq!(groups.value(i), "03");
                assert!((acc.value(i) - 1.0).abs() < 1e-9, "row {} scored {}", i, acc.value(i));
                scored += 1;
            } else {
                assert!(acc.is_null(i));
            }
        }
        assert_eq!(scored, 3);
    }

    #[tokio::test]
    async fn should_fail_on_missing_input() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "").unwrap();

        let args = ScoreArgs {
            forecast: dir.path().join("missing-fc.parquet"),
            observation: dir.path().join("missing-obs.parquet"),
            lead_unit: Some(LeadUnit::Days),
            grouping: None,
            members: None,
            metric: None,
            output: Some(dir.path().join("skill.parquet")),
        };

        assert!(score(&args, Some(&config_path)).await.is_err());
        assert!(!dir.path().join("skill.parquet").exists());
    }
}
