//! Anomaly correlation skill of a forecast ensemble against observations.
//!
//! For every lead the forecasts are paired with the observation at their
//! valid time. Each side has its own phase-bucketed climatology removed
//! before the Pearson correlation of the anomalies is taken. Undefined
//! correlations (too few samples, no variance) are NaN rather than errors.

pub mod align;
pub mod climatology;
pub mod correlation;
pub mod result;

use tracing::{debug, info, warn};

use crate::{
    config::{Grouping, Metric, SkillConfig},
    data::{ForecastEnsemble, ObservationSeries},
    error::{Result, SkillError},
};

pub use align::{pair_at_lead, PairedSamples};
pub use climatology::{paired_anomalies, Climatology, MIN_BUCKET_SAMPLES};
pub use correlation::pearson;
pub use result::{SkillCell, SkillResult, SkillRow};

/// Scores `forecast` against `observation` at every lead.
pub fn compute_skill(
    forecast: &ForecastEnsemble,
    observation: &ObservationSeries,
    metric: Metric,
    grouping: Option<Grouping>,
) -> Result<SkillResult> {
    let config = SkillConfig::new(forecast.lead_unit())
        .with_metric(metric)
        .with_grouping(grouping);

    SkillEvaluator::new(config).compute_skill(forecast, observation)
}

#[derive(Debug, Clone)]
pub struct SkillEvaluator {
    config: SkillConfig,
}

struct Partition {
    label: Option<String>,
    inits: Vec<usize>,
}

impl SkillEvaluator {
    pub fn new(config: SkillConfig) -> Self {
        SkillEvaluator { config }
    }

    pub fn config(&self) -> &SkillConfig {
        &self.config
    }

    /// Checks that the inputs share the configured lead unit space.
    pub fn validate(
        &self,
        forecast: &ForecastEnsemble,
        observation: &ObservationSeries,
    ) -> Result<()> {
        let unit = self.config.lead_unit;

        if let Some(Grouping::Month(month)) = self.config.grouping {
            if !(1..=12).contains(&month) {
                return Err(SkillError::InvalidGrouping(format!(
                    "month {} is not between 1 and 12",
                    month
                )));
            }
        }

        if forecast.lead_unit() != unit {
            return Err(SkillError::UnitMismatch(format!(
                "forecast leads are in {} but the run is configured for {}",
                forecast.lead_unit(),
                unit
            )));
        }

        match observation.frequency() {
            Some(observed) if !unit.accepts(observed) => {
                Err(SkillError::UnitMismatch(format!(
                    "observations sampled in {} cannot be aligned with leads in {}",
                    observed, unit
                )))
            }
            None if observation.len() >= 2 => {
                warn!("observation sampling frequency could not be inferred");
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Number of (group, lead) cells a run over `forecast` produces.
    pub fn cell_count(&self, forecast: &ForecastEnsemble) -> usize {
        let groups = self.config.grouping.map_or(1, |g| g.keys().len());
        groups * forecast.leads().len()
    }

    pub fn compute_skill(
        &self,
        forecast: &ForecastEnsemble,
        observation: &ObservationSeries,
    ) -> Result<SkillResult> {
        self.compute_skill_with(forecast, observation, || {})
    }

    /// As [`SkillEvaluator::compute_skill`], calling `on_cell` after each
    /// (group, lead) cell is scored.
    pub fn compute_skill_with<F: FnMut()>(
        &self,
        forecast: &ForecastEnsemble,
        observation: &ObservationSeries,
        mut on_cell: F,
    ) -> Result<SkillResult> {
        self.validate(forecast, observation)?;

        let mut rows = Vec::new();
        for partition in self.partitions(forecast) {
            let mut cells = Vec::with_capacity(forecast.leads().len());

            for lead in 0..forecast.leads().len() {
                let samples = pair_at_lead(
                    forecast,
                    observation,
                    &partition.inits,
                    lead,
                    self.config.members,
                )?;
                let (f, o) = paired_anomalies(&samples.forecast, &samples.observed, &samples.phases);
                let value = pearson(&f, &o);

                debug!(
                    group = partition.label.as_deref().unwrap_or("all"),
                    lead,
                    paired = samples.len(),
                    scored = f.len(),
                    dropped = samples.dropped,
                    value,
                    "scored lead"
                );

                cells.push(SkillCell {
                    value,
                    samples: f.len(),
                });
                on_cell();
            }

            rows.push(SkillRow {
                group: partition.label,
                cells,
            });
        }

        info!(
            metric = self.config.metric.as_str(),
            lead_unit = %self.config.lead_unit,
            leads = forecast.leads().len(),
            groups = rows.len(),
            "skill computed"
        );

        Ok(SkillResult {
            metric: self.config.metric,
            lead_unit: self.config.lead_unit,
            leads: forecast.leads().to_vec(),
            rows,
        })
    }

    fn partitions(&self, forecast: &ForecastEnsemble) -> Vec<Partition> {
        let inits = forecast.inits();

        match self.config.grouping {
            None => vec![Partition {
                label: None,
                inits: (0..inits.len()).collect(),
            }],
            Some(grouping) => grouping
                .keys()
                .into_iter()
                .map(|key| Partition {
                    label: Some(grouping.label(key)),
                    inits: inits
                        .iter()
                        .enumerate()
                        .filter(|(_, init)| grouping.key_of(**init) == key)
                        .map(|(idx, _)| idx)
                        .collect(),
                })
                .collect(),
        }
    }
}

// -- Tests -------------------------------------------------------------------
