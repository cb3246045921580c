//! Phase-bucketed climatology and anomalies.

use std::collections::BTreeMap;

use super::correlation::is_rounding_level;

/// Smallest number of samples a phase bucket needs for its mean to be used.
pub const MIN_BUCKET_SAMPLES: usize = 2;

#[derive(Debug, Clone, Default, PartialEq)]
/// Mean value per phase bucket.
pub struct Climatology {
    means: BTreeMap<u32, f64>,
}

impl Climatology {
    /// Averages `values` per phase. Buckets with fewer than `min_samples`
    /// entries get no mean.
    pub fn fit(values: &[f64], phases: &[u32], min_samples: usize) -> Self {
        let mut sums: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
        for (value, phase) in values.iter().zip(phases) {
            let entry = sums.entry(*phase).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }

        let means = sums
            .into_iter()
            .filter(|(_, (_, count))| *count >= min_samples)
            .map(|(phase, (sum, count))| (phase, sum / count as f64))
            .collect();

        Climatology { means }
    }

    pub fn mean(&self, phase: u32) -> Option<f64> {
        self.means.get(&phase).copied()
    }

    /// `value` minus its phase mean. Differences at the rounding level of
    /// the operands are exactly zero.
    pub fn anomaly(&self, value: f64, phase: u32) -> Option<f64> {
        self.mean(phase).map(|mean| {
            let anomaly = value - mean;
            if is_rounding_level(anomaly.abs(), value.abs().max(mean.abs())) {
                0.0
            } else {
                anomaly
            }
        })
    }
}

/// Paired anomalies after removing each side's own climatology.
///
/// Samples in buckets too small for a climatology are dropped.
pub fn paired_anomalies(
    forecast: &[f64],
    observed: &[f64],
    phases: &[u32],
) -> (Vec<f64>, Vec<f64>) {
    let forecast_clim = Climatology::fit(forecast, phases, MIN_BUCKET_SAMPLES);
    let observed_clim = Climatology::fit(observed, phases, MIN_BUCKET_SAMPLES);

    forecast
        .iter()
        .zip(observed)
        .zip(phases)
        .filter_map(|((f, o), phase)| {
            Some((
                forecast_clim.anomaly(*f, *phase)?,
                observed_clim.anomaly(*o, *phase)?,
            ))
        })
        .unzip()
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn should_average_per_phase() {
        let clim = Climatology::fit(&[1.0, 3.0, 10.0, 20.0, 5.0], &[1, 1, 2, 2, 3], 2);

        assert_eq!(clim.mean(1), Some(2.0));
        assert_eq!(clim.mean(2), Some(15.0));
        assert_eq!(clim.mean(3), None);
        assert_eq!(clim.anomaly(4.0, 1), Some(2.0));
    }

    #[test]
    fn should_drop_small_buckets() {
        let (f, o) = paired_anomalies(&[1.0, 3.0, 7.0], &[2.0, 6.0, 9.0], &[1, 1, 2]);

        assert_eq!(f, vec![-1.0, 1.0]);
        assert_eq!(o, vec![-2.0, 2.0]);
    }

    #[test]
    fn should_use_independent_climatologies() {
        let (f, o) = paired_anomalies(&[11.0, 13.0], &[1.0, 3.0], &[5, 5]);

        assert_eq!(f, o);
    }

    #[test]
    fn should_zero_rounding_residuals_of_constant_values() {
        let values = [300.1; 7];
        let clim = Climatology::fit(&values, &[4; 7], 2);

        assert_eq!(clim.anomaly(300.1, 4), Some(0.0));

        let (f, _) = paired_anomalies(&values, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0], &[4; 7]);
        assert!(f.iter().all(|a| *a == 0.0));
    }

    #[test]
    fn should_keep_small_scale_anomalies() {
        let clim = Climatology::fit(&[1e-13, 3e-13], &[1, 1], 2);

        let anomaly = clim.anomaly(3e-13, 1).unwrap();
        assert!((anomaly - 1e-13).abs() < 1e-25);
    }
}
