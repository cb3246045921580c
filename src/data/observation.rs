//! Observed reference series indexed by date.

use chrono::NaiveDate;

use crate::{
    error::{Result, SkillError},
    lead::LeadUnit,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSeries {
    times: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl ObservationSeries {
    /// Timestamps must be strictly increasing.
    pub fn new(times: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if times.len() != values.len() {
            return Err(SkillError::InvalidShape {
                expected: times.len(),
                got: values.len(),
            });
        }

        if let Some(w) = times.windows(2).find(|w| w[0] >= w[1]) {
            return Err(SkillError::NonMonotonicTime {
                previous: w[0],
                next: w[1],
            });
        }

        Ok(ObservationSeries { times, values })
    }

    /// Sorts rows by date first. Repeated dates are still rejected.
    pub fn from_unsorted(mut rows: Vec<(NaiveDate, f64)>) -> Result<Self> {
        rows.sort_by_key(|(t, _)| *t);
        let (times, values) = rows.into_iter().unzip();

        ObservationSeries::new(times, values)
    }

    pub fn times(&self) -> &[NaiveDate] {
        &self.times
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Finite observation at `date`, if one exists.
    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        self.times
            .binary_search(&date)
            .ok()
            .map(|idx| self.values[idx])
            .filter(|v| v.is_finite())
    }

    pub fn frequency(&self) -> Option<LeadUnit> {
        LeadUnit::infer(&self.times)
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn should_look_up_values() {
        let obs = ObservationSeries::new(
            vec![date(2020, 1, 1), date(2020, 1, 2), date(2020, 1, 3)],
            vec![1.0, f64::NAN, 3.0],
        )
        .unwrap();

        assert_eq!(obs.value_at(date(2020, 1, 1)), Some(1.0));
        assert_eq!(obs.value_at(date(2020, 1, 2)), None);
        assert_eq!(obs.value_at(date(2020, 1, 4)), None);
        assert_eq!(obs.frequency(), Some(LeadUnit::Days));
    }

    #[test]
    fn should_reject_unsorted_times() {
        let err = ObservationSeries::new(vec![date(2020, 1, 2), date(2020, 1, 1)], vec![0.0, 0.0])
            .unwrap_err();

        assert!(matches!(err, SkillError::NonMonotonicTime { .. }));
    }

    #[test]
    fn should_reject_duplicate_times() {
        let rows = vec![(date(2020, 1, 1), 0.0), (date(2020, 1, 1), 1.0)];

        assert!(ObservationSeries::from_unsorted(rows).is_err());
    }

    #[test]
    fn should_sort_rows() {
        let rows = vec![(date(2020, 1, 2), 2.0), (date(2020, 1, 1), 1.0)];
        let obs = ObservationSeries::from_unsorted(rows).unwrap();

        assert_eq!(obs.times(), &[date(2020, 1, 1), date(2020, 1, 2)]);
        assert_eq!(obs.values(), &[1.0, 2.0]);
    }
}
