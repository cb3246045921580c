//! Decoding of CF-style numeric time axes onto Gregorian dates.
//!
//! Time columns written by climate tooling are often stored as offsets such
//! as `days since 1981-01-01` together with a `calendar` attribute. Model
//! calendars (`noleap`, `360_day`, ...) are decoded with their own month
//! lengths and the resulting year/month/day must exist in the Gregorian
//! calendar for the date to be usable against observations.

use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike};

use crate::error::{Result, SkillError};

const NOLEAP_MONTHS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const ALL_LEAP_MONTHS: [u32; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const DAY360_MONTHS: [u32; 12] = [30; 12];

/// Offsets beyond this many days from the reference date are not decoded.
const MAX_ELAPSED_DAYS: f64 = 1e15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Calendar {
    /// `standard` and `gregorian`. Decoded as proleptic Gregorian.
    #[default]
    Standard,
    ProlepticGregorian,
    /// `noleap` and `365_day`.
    NoLeap,
    /// `all_leap` and `366_day`.
    AllLeap,
    Day360,
}

impl Calendar {
    pub fn from_cf_attr(attr: &str) -> Result<Self> {
        match attr.trim().to_lowercase().as_str() {
            "" | "standard" | "gregorian" => Ok(Calendar::Standard),
            "proleptic_gregorian" => Ok(Calendar::ProlepticGregorian),
            "noleap" | "365_day" => Ok(Calendar::NoLeap),
            "all_leap" | "366_day" => Ok(Calendar::AllLeap),
            "360_day" => Ok(Calendar::Day360),
            other => Err(SkillError::Calendar(format!(
                "unrecognised calendar attribute `{}`",
                other
            ))),
        }
    }

    fn month_lengths(&self) -> Option<&'static [u32; 12]> {
        match self {
            Calendar::Standard | Calendar::ProlepticGregorian => None,
            Calendar::NoLeap => Some(&NOLEAP_MONTHS),
            Calendar::AllLeap => Some(&ALL_LEAP_MONTHS),
            Calendar::Day360 => Some(&DAY360_MONTHS),
        }
    }
}

impl FromStr for Calendar {
    type Err = SkillError;

    fn from_str(s: &str) -> Result<Self> {
        Calendar::from_cf_attr(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    Days,
    Hours,
}

impl Step {
    fn per_day(&self) -> f64 {
        match self {
            Step::Days => 1.0,
            Step::Hours => 24.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// A parsed `"<unit> since <reference>"` time encoding.
pub struct CfTime {
    step: Step,
    calendar: Calendar,
    year: i32,
    month: u32,
    day: u32,
    /// Time of day of the reference, as a fraction of a day.
    day_fraction: f64,
}

impl CfTime {
    pub fn parse(units: &str, calendar: Calendar) -> Result<Self> {
        let malformed = || SkillError::Calendar(format!("malformed time units `{}`", units));

        let (step, reference) = units.trim().split_once(" since ").ok_or_else(malformed)?;
        let step = match step.trim().to_lowercase().as_str() {
            "days" | "day" | "d" => Step::Days,
            "hours" | "hour" | "h" => Step::Hours,
            other => {
                return Err(SkillError::Calendar(format!(
                    "unsupported time step `{}`, expected days or hours",
                    other
                )))
            }
        };

        let reference = reference.trim();
        let (date_part, time_part) = match reference.split_once(|c: char| c == ' ' || c == 'T') {
            Some((date, time)) => (date, Some(time.trim())),
            None => (reference, None),
        };

        let mut fields = date_part.splitn(3, '-');
        let year = fields
            .next()
            .and_then(|s| s.parse::<i32>().ok())
            .ok_or_else(malformed)?;
        let month = fields
            .next()
            .and_then(|s| s.parse::<u32>().ok())
            .ok_or_else(malformed)?;
        let day = fields
            .next()
            .and_then(|s| s.parse::<u32>().ok())
            .ok_or_else(malformed)?;

        let day_fraction = match time_part {
            Some(time) => parse_time_of_day(time).ok_or_else(malformed)?,
            None => 0.0,
        };

        let cf = CfTime {
            step,
            calendar,
            year,
            month,
            day,
            day_fraction,
        };
        cf.check_reference()?;

        Ok(cf)
    }

    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    /// Decodes one offset to the day it falls on.
    pub fn decode(&self, offset: f64) -> Result<NaiveDate> {
        if !offset.is_finite() {
            return Err(SkillError::Calendar(format!(
                "time offset {} is not finite",
                offset
            )));
        }

        let out_of_range =
            || SkillError::Calendar(format!("offset {} is out of range", offset));

        let elapsed = (self.day_fraction + offset / self.step.per_day()).floor();
        if !(elapsed.abs() < MAX_ELAPSED_DAYS) {
            return Err(out_of_range());
        }
        let elapsed = elapsed as i64;

        match self.calendar.month_lengths() {
            None => {
                let reference = NaiveDate::from_ymd_opt(self.year, self.month, self.day)
                    .ok_or_else(|| self.missing_reference())?;
                Duration::try_days(elapsed)
                    .and_then(|delta| reference.checked_add_signed(delta))
                    .ok_or_else(out_of_range)
            }
            Some(months) => {
                let start = fixed_day_number(months, self.year, self.month, self.day);
                let number = start.checked_add(elapsed).ok_or_else(out_of_range)?;
                let (year, month, day) = fixed_from_day_number(months, number)?;
                NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
                    SkillError::Calendar(format!(
                        "{:04}-{:02}-{:02} in the {:?} calendar does not exist in the Gregorian calendar",
                        year, month, day, self.calendar
                    ))
                })
            }
        }
    }

    pub fn decode_all(&self, offsets: &[f64]) -> Result<Vec<NaiveDate>> {
        offsets.iter().map(|o| self.decode(*o)).collect()
    }

    fn check_reference(&self) -> Result<()> {
        let exists = match self.calendar.month_lengths() {
            None => NaiveDate::from_ymd_opt(self.year, self.month, self.day).is_some(),
            Some(months) => {
                (1..=12).contains(&self.month)
                    && self.day >= 1
                    && self.day <= months[self.month as usize - 1]
            }
        };

        if exists {
            Ok(())
        } else {
            Err(self.missing_reference())
        }
    }

    fn missing_reference(&self) -> SkillError {
        SkillError::Calendar(format!(
            "reference date {:04}-{:02}-{:02} does not exist in the {:?} calendar",
            self.year, self.month, self.day, self.calendar
        ))
    }
}

fn parse_time_of_day(time: &str) -> Option<f64> {
    let time = time.trim_end_matches('Z');
    let time = time.split(|c: char| c == '+' || c == ' ').next()?;
    let parsed = NaiveTime::parse_from_str(time, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
        .ok()?;

    Some(parsed.num_seconds_from_midnight() as f64 / 86_400.0)
}

fn fixed_day_number(months: &[u32; 12], year: i32, month: u32, day: u32) -> i64 {
    let year_length: i64 = months.iter().map(|m| *m as i64).sum();
    let before: i64 = months[..month as usize - 1].iter().map(|m| *m as i64).sum();

    year as i64 * year_length + before + (day as i64 - 1)
}

fn fixed_from_day_number(months: &[u32; 12], number: i64) -> Result<(i32, u32, u32)> {
    let year_length: i64 = months.iter().map(|m| *m as i64).sum();
    let year = number.div_euclid(year_length);
    let mut remaining = number.rem_euclid(year_length);

    let mut month = 1;
    for length in months {
        let length = *length as i64;
        if remaining < length {
            break;
        }
        remaining -= length;
        month += 1;
    }

    let year = i32::try_from(year)
        .map_err(|_| SkillError::Calendar(format!("year {} is out of range", year)))?;

    Ok((year, month, remaining as u32 + 1))
}

/// Days between 0001-01-01 and 1970-01-01, the epoch of Arrow `Date32`.
pub fn epoch_days_from_ce() -> i32 {
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .map(|d| d.num_days_from_ce())
        .unwrap_or(719_163)
}

pub fn from_date32(value: i32) -> Result<NaiveDate> {
    value
        .checked_add(epoch_days_from_ce())
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| SkillError::Calendar(format!("date32 value {} is out of range", value)))
}

pub fn to_date32(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - epoch_days_from_ce()
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn should_parse_calendar_attributes() {
        assert_eq!(Calendar::from_cf_attr("gregorian").unwrap(), Calendar::Standard);
        assert_eq!(Calendar::from_cf_attr("365_day").unwrap(), Calendar::NoLeap);
        assert_eq!(Calendar::from_cf_attr("366_day").unwrap(), Calendar::AllLeap);
        assert_eq!(Calendar::from_cf_attr("360_day").unwrap(), Calendar::Day360);
        assert_eq!(
            Calendar::from_cf_attr("Proleptic_Gregorian").unwrap(),
            Calendar::ProlepticGregorian
        );
    }

    #[test]
    fn should_reject_unknown_calendar() {
        let err = Calendar::from_cf_attr("julian").unwrap_err();
        assert!(matches!(err, SkillError::Calendar(_)));
    }

    #[test]
    fn should_decode_standard_days() {
        let cf = CfTime::parse("days since 1981-01-01", Calendar::Standard).unwrap();

        assert_eq!(cf.decode(0.0).unwrap(), date(1981, 1, 1));
        assert_eq!(cf.decode(59.0).unwrap(), date(1981, 3, 1));
        assert_eq!(cf.decode(-1.0).unwrap(), date(1980, 12, 31));
        assert_eq!(cf.decode(0.75).unwrap(), date(1981, 1, 1));
    }

    #[test]
    fn should_decode_hours_with_reference_time() {
        let cf = CfTime::parse("hours since 2000-01-01 12:00:00", Calendar::Standard).unwrap();

        assert_eq!(cf.decode(6.0).unwrap(), date(2000, 1, 1));
        assert_eq!(cf.decode(12.0).unwrap(), date(2000, 1, 2));
    }

    #[test]
    fn should_decode_noleap_across_february() {
        let cf = CfTime::parse("days since 2000-02-28", Calendar::NoLeap).unwrap();

        assert_eq!(cf.decode(1.0).unwrap(), date(2000, 3, 1));
        assert_eq!(cf.decode(365.0).unwrap(), date(2001, 2, 28));
    }

    #[test]
    fn should_decode_360_day() {
        let cf = CfTime::parse("days since 2000-01-01", Calendar::Day360).unwrap();

        assert_eq!(cf.decode(30.0).unwrap(), date(2000, 2, 1));
        assert_eq!(cf.decode(360.0).unwrap(), date(2001, 1, 1));

        let err = cf.decode(59.0).unwrap_err();
        assert!(matches!(err, SkillError::Calendar(_)));
    }

    #[test]
    fn should_reject_all_leap_day_outside_leap_year() {
        let cf = CfTime::parse("days since 2001-02-28", Calendar::AllLeap).unwrap();

        assert_eq!(cf.decode(2.0).unwrap(), date(2001, 3, 1));
        assert!(cf.decode(1.0).is_err());
    }

    #[test]
    fn should_reject_malformed_units() {
        assert!(CfTime::parse("seconds since 2000-01-01", Calendar::Standard).is_err());
        assert!(CfTime::parse("days after 2000-01-01", Calendar::Standard).is_err());
        assert!(CfTime::parse("days since 2000-02-30", Calendar::Standard).is_err());
        assert!(CfTime::parse("days since 2000-02-30", Calendar::Day360).is_ok());
    }

    #[test]
    fn should_round_trip_date32() {
        let d = date(2019, 7, 14);
        assert_eq!(from_date32(to_date32(d)).unwrap(), d);
        assert_eq!(to_date32(date(1970, 1, 1)), 0);
    }

    #[test]
    fn should_reject_date32_out_of_range() {
        assert!(matches!(from_date32(i32::MAX), Err(SkillError::Calendar(_))));
        assert!(matches!(from_date32(i32::MIN), Err(SkillError::Calendar(_))));
    }

    #[test]
    fn should_reject_huge_offsets() {
        for calendar in [Calendar::Standard, Calendar::NoLeap, Calendar::AllLeap, Calendar::Day360] {
            let cf = CfTime::parse("days since 2000-01-01", calendar).unwrap();

            for offset in [1e300, -1e300, 1e12, -1e12] {
                let err = cf.decode(offset).unwrap_err();
                assert!(matches!(err, SkillError::Calendar(_)), "{:?} {}", calendar, offset);
            }
        }
    }

    #[test]
    fn should_reject_model_calendar_year_beyond_i32() {
        let err = fixed_from_day_number(&NOLEAP_MONTHS, 365 * (i32::MAX as i64 + 1)).unwrap_err();

        assert!(err.to_string().contains("out of range"));
    }
}
