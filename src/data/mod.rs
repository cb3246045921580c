//! In-memory forecast and observation arrays.

pub mod forecast;
pub mod observation;

pub use forecast::{ForecastEnsemble, ForecastRecord};
pub use observation::ObservationSeries;
