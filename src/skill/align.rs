//! Pairing of forecast values with observations at their valid time.

use crate::{
    config::MemberHandling,
    data::{ForecastEnsemble, ObservationSeries},
    error::Result,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairedSamples {
    pub forecast: Vec<f64>,
    pub observed: Vec<f64>,
    /// Climatological phase of each sample's valid time.
    pub phases: Vec<u32>,
    /// Initializations skipped for want of an observation or a finite member.
    pub dropped: usize,
}

impl PairedSamples {
    pub fn len(&self) -> usize {
        self.forecast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forecast.is_empty()
    }
}

/// Pairs the forecasts of the initializations at positions `inits` and lead
/// position `lead` with the observation at each valid time.
pub fn pair_at_lead(
    forecast: &ForecastEnsemble,
    observation: &ObservationSeries,
    inits: &[usize],
    lead: usize,
    members: MemberHandling,
) -> Result<PairedSamples> {
    let unit = forecast.lead_unit();
    let lead_offset = forecast.leads()[lead];
    let mut samples = PairedSamples::default();

    for &init_idx in inits {
        let valid_time = unit.valid_time(forecast.inits()[init_idx], lead_offset)?;

        let Some(observed) = observation.value_at(valid_time) else {
            samples.dropped += 1;
            continue;
        };

        let finite = forecast
            .members(init_idx, lead)
            .iter()
            .copied()
            .filter(|v| v.is_finite());
        let phase = unit.phase(valid_time);

        match members {
            MemberHandling::Mean => {
                let (sum, count) = finite.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
                if count == 0 {
                    samples.dropped += 1;
                    continue;
                }
                samples.forecast.push(sum / count as f64);
                samples.observed.push(observed);
                samples.phases.push(phase);
            }
            MemberHandling::Pooled => {
                let before = samples.forecast.len();
                for value in finite {
                    samples.forecast.push(value);
                    samples.observed.push(observed);
                    samples.phases.push(phase);
                }
                if samples.forecast.len() == before {
                    samples.dropped += 1;
                }
            }
        }
    }

    Ok(samples)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use chrono::NaiveDate;

    use super::*;
    use crate::lead::LeadUnit;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixture() -> (ForecastEnsemble, ObservationSeries) {
        let inits = vec![date(2020, 1, 1), date(2020, 1, 2), date(2020, 1, 3)];
        // (init, lead, member)
        let values = vec![
            1.0, 3.0, 10.0, 12.0, //
            f64::NAN, f64::NAN, 20.0, 22.0, //
            5.0, f64::NAN, 30.0, 32.0,
        ];
        let fc = ForecastEnsemble::new(inits, vec![0, 1], 2, LeadUnit::Days, values).unwrap();
        let obs = ObservationSeries::new(
            vec![date(2020, 1, 1), date(2020, 1, 2), date(2020, 1, 3)],
            vec![100.0, 200.0, 300.0],
        )
        .unwrap();

        (fc, obs)
    }

    #[test]
    fn should_average_members() {
        let (fc, obs) = fixture();
        let samples = pair_at_lead(&fc, &obs, &[0, 1, 2], 0, MemberHandling::Mean).unwrap();

        assert_eq!(samples.forecast, vec![2.0, 5.0]);
        assert_eq!(samples.observed, vec![100.0, 300.0]);
        assert_eq!(samples.phases, vec![1, 1]);
        assert_eq!(samples.dropped, 1);
    }

    #[test]
    fn should_pool_members() {
        let (fc, obs) = fixture();
        let samples = pair_at_lead(&fc, &obs, &[0, 1, 2], 0, MemberHandling::Pooled).unwrap();

        assert_eq!(samples.forecast, vec![1.0, 3.0, 5.0]);
        assert_eq!(samples.observed, vec![100.0, 100.0, 300.0]);
    }

    #[test]
    fn should_drop_missing_observations() {
        let (fc, obs) = fixture();
        let samples = pair_at_lead(&fc, &obs, &[0, 1, 2], 1, MemberHandling::Mean).unwrap();

        assert_eq!(samples.forecast, vec![11.0, 21.0]);
        assert_eq!(samples.observed, vec![200.0, 300.0]);
        assert_eq!(samples.dropped, 1);
    }
}
