//! Seasonal aggregation of monthly series.

use chrono::{Datelike, Months};

use crate::{
    data::ObservationSeries,
    error::{Result, SkillError},
    lead::LeadUnit,
};

/// Centered 3-month rolling mean of a monthly series.
///
/// Each mean is stamped at its center month. Windows that do not span three
/// consecutive calendar months, or that hold a non-finite value, are skipped.
pub fn seasonal_means(series: &ObservationSeries) -> Result<ObservationSeries> {
    match series.frequency() {
        Some(LeadUnit::Months) | None => {}
        Some(other) => {
            return Err(SkillError::UnitMismatch(format!(
                "seasonal means need a monthly series, found {}",
                other
            )))
        }
    }

    let times = series.times();
    let values = series.values();
    let mut out_times = Vec::new();
    let mut out_values = Vec::new();

    for i in 1..times.len().saturating_sub(1) {
        let consecutive = times[i - 1].checked_add_months(Months::new(1)).map(month_of)
            == Some(month_of(times[i]))
            && times[i].checked_add_months(Months::new(1)).map(month_of)
                == Some(month_of(times[i + 1]));
        let window = &values[i - 1..=i + 1];

        if consecutive && window.iter().all(|v| v.is_finite()) {
            out_times.push(times[i]);
            out_values.push(window.iter().sum::<f64>() / 3.0);
        }
    }

    ObservationSeries::new(out_times, out_values)
}

fn month_of<D: Datelike>(date: D) -> (i32, u32) {
    (date.year(), date.month())
}

// -- Tests -------------------------------------------------------------------
