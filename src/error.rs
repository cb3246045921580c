//! Errors raised by the skill computation and its inputs.

use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T, E = SkillError> = std::result::Result<T, E>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SkillError {
    /// Lead unit outside the recognised set, or an observation frequency
    /// that cannot serve the lead unit.
    #[error("unit mismatch: {0}")]
    UnitMismatch(String),

    /// Timestamps that cannot be brought onto the common calendar.
    #[error("calendar error: {0}")]
    Calendar(String),

    #[error("invalid leads: {0}")]
    InvalidLeads(String),

    #[error("invalid shape: expected {expected} values, got {got}")]
    InvalidShape { expected: usize, got: usize },

    #[error("timestamps must be strictly increasing: {previous} is followed by {next}")]
    NonMonotonicTime { previous: NaiveDate, next: NaiveDate },

    #[error("duplicate initialization date {0}")]
    DuplicateInit(NaiveDate),

    #[error("duplicate forecast value for init {init}, lead {lead}, member {member}")]
    DuplicateRecord {
        init: NaiveDate,
        lead: u32,
        member: i64,
    },

    #[error("invalid grouping `{0}`: expected init_month, init_season or a month number 1-12")]
    InvalidGrouping(String),

    #[error("unsupported metric `{0}`: only acc is available")]
    UnsupportedMetric(String),

    #[error("configuration error: {0}")]
    Config(String),
}
