//! Lead-dependent anomaly correlation skill of subseasonal-to-seasonal
//! forecast ensembles.
//!
//! ```no_run
//! use s2s_skill::{compute_skill, config::Metric, ForecastEnsemble, ObservationSeries};
//!
//! # fn run(forecast: ForecastEnsemble, observation: ObservationSeries) -> s2s_skill::Result<()> {
//! let result = compute_skill(&forecast, &observation, Metric::Acc, None)?;
//! println!("{}", result);
//! # Ok(())
//! # }
//! ```

pub mod calendar;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod lead;
pub mod parquet;
pub mod skill;
pub mod transform;

pub use config::{Grouping, MemberHandling, Metric, SkillConfig};
pub use data::{ForecastEnsemble, ForecastRecord, ObservationSeries};
pub use error::{Result, SkillError};
pub use lead::LeadUnit;
pub use skill::{compute_skill, SkillEvaluator, SkillResult};
