//! Lead units, valid-time arithmetic and the climatological phase of a date.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Deserialize;

use crate::error::{Result, SkillError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
/// Physical unit of one lead step.
pub enum LeadUnit {
    Years,
    Seasons,
    Months,
    Weeks,
    Pentads,
    Days,
}

impl LeadUnit {
    pub const ALL: [LeadUnit; 6] = [
        LeadUnit::Years,
        LeadUnit::Seasons,
        LeadUnit::Months,
        LeadUnit::Weeks,
        LeadUnit::Pentads,
        LeadUnit::Days,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadUnit::Years => "years",
            LeadUnit::Seasons => "seasons",
            LeadUnit::Months => "months",
            LeadUnit::Weeks => "weeks",
            LeadUnit::Pentads => "pentads",
            LeadUnit::Days => "days",
        }
    }

    /// Returns the date `lead` steps after `init`.
    ///
    /// Month based units keep the day of month, clamped to the last day of
    /// the target month.
    pub fn valid_time(&self, init: NaiveDate, lead: u32) -> Result<NaiveDate> {
        let shifted = match self {
            LeadUnit::Days => init.checked_add_days(Days::new(lead as u64)),
            LeadUnit::Pentads => init.checked_add_days(Days::new(5 * lead as u64)),
            LeadUnit::Weeks => init.checked_add_days(Days::new(7 * lead as u64)),
            LeadUnit::Months => init.checked_add_months(Months::new(lead)),
            LeadUnit::Seasons => init.checked_add_months(Months::new(3 * lead)),
            LeadUnit::Years => init.checked_add_months(Months::new(12 * lead)),
        };

        shifted.ok_or_else(|| {
            SkillError::Calendar(format!(
                "{} advanced by {} {} is out of range",
                init,
                lead,
                self.as_str()
            ))
        })
    }

    /// Climatological bucket a date falls in for this unit.
    ///
    /// Sub-monthly and monthly units use the calendar month (1-12), seasonal
    /// units the meteorological season (0 = DJF .. 3 = SON), yearly units a
    /// single bucket.
    pub fn phase(&self, date: NaiveDate) -> u32 {
        match self {
            LeadUnit::Days | LeadUnit::Pentads | LeadUnit::Weeks | LeadUnit::Months => date.month(),
            LeadUnit::Seasons => season_of(date),
            LeadUnit::Years => 0,
        }
    }

    /// Infers the sampling frequency of a sorted series of dates from its
    /// median spacing. Returns `None` when fewer than two dates are given or
    /// when the spacing matches no unit.
    pub fn infer(dates: &[NaiveDate]) -> Option<LeadUnit> {
        if dates.len() < 2 {
            return None;
        }

        let day_gaps = dates
            .windows(2)
            .map(|w| (w[1] - w[0]).num_days())
            .collect();
        match median(day_gaps) {
            1 => return Some(LeadUnit::Days),
            5 => return Some(LeadUnit::Pentads),
            7 => return Some(LeadUnit::Weeks),
            _ => {}
        }

        let first_day = dates[0].day();
        let monthly_stamps = dates.iter().all(|d| d.day() == first_day)
            || dates.iter().all(|d| is_month_end(*d));
        if !monthly_stamps {
            return None;
        }

        let month_gaps = dates
            .windows(2)
            .map(|w| month_index(w[1]) - month_index(w[0]))
            .collect();
        match median(month_gaps) {
            1 => Some(LeadUnit::Months),
            3 => Some(LeadUnit::Seasons),
            12 => Some(LeadUnit::Years),
            _ => None,
        }
    }

    /// Whether a series sampled at `observed` can be looked up at the valid
    /// times of this unit.
    pub fn accepts(&self, observed: LeadUnit) -> bool {
        use LeadUnit::*;

        match self {
            Days => matches!(observed, Days),
            Pentads => matches!(observed, Days | Pentads),
            Weeks => matches!(observed, Days | Weeks),
            Months => matches!(observed, Months),
            Seasons => matches!(observed, Months | Seasons),
            Years => matches!(observed, Months | Seasons | Years),
        }
    }
}

impl fmt::Display for LeadUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadUnit {
    type Err = SkillError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "years" | "year" => Ok(LeadUnit::Years),
            "seasons" | "season" => Ok(LeadUnit::Seasons),
            "months" | "month" => Ok(LeadUnit::Months),
            "weeks" | "week" => Ok(LeadUnit::Weeks),
            "pentads" | "pentad" => Ok(LeadUnit::Pentads),
            "days" | "day" => Ok(LeadUnit::Days),
            other => Err(SkillError::UnitMismatch(format!(
                "unknown lead unit `{}`, expected one of years, seasons, months, weeks, pentads, days",
                other
            ))),
        }
    }
}

impl TryFrom<String> for LeadUnit {
    type Error = SkillError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Meteorological season of a date: 0 = DJF, 1 = MAM, 2 = JJA, 3 = SON.
pub fn season_of(date: NaiveDate) -> u32 {
    (date.month() % 12) / 3
}

pub fn season_label(season: u32) -> &'static str {
    match season {
        0 => "DJF",
        1 => "MAM",
        2 => "JJA",
        _ => "SON",
    }
}

fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

fn is_month_end(date: NaiveDate) -> bool {
    date.succ_opt().map_or(true, |next| next.month() != date.month())
}

fn median(mut values: Vec<i64>) -> i64 {
    values.sort_unstable();
    values[values.len() / 2]
}

// -- Tests -------------------------------------------------------------------
