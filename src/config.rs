//! Run configuration: the skill settings record and its TOML file form.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::{
    error::{Result, SkillError},
    lead::{season_label, season_of, LeadUnit},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
/// Partition of initializations scored independently.
pub enum Grouping {
    /// Twelve groups keyed by initialization month.
    InitMonth,
    /// Four groups keyed by the meteorological season of initialization.
    InitSeason,
    /// Only initializations in the given month (1-12).
    Month(u32),
}

impl Grouping {
    pub fn keys(&self) -> Vec<u32> {
        match self {
            Grouping::InitMonth => (1..=12).collect(),
            Grouping::InitSeason => (0..4).collect(),
            Grouping::Month(m) => vec![*m],
        }
    }

    pub fn key_of(&self, init: NaiveDate) -> u32 {
        match self {
            Grouping::InitMonth | Grouping::Month(_) => init.month(),
            Grouping::InitSeason => season_of(init),
        }
    }

    pub fn label(&self, key: u32) -> String {
        match self {
            Grouping::InitMonth | Grouping::Month(_) => format!("{:02}", key),
            Grouping::InitSeason => season_label(key).to_string(),
        }
    }
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grouping::InitMonth => f.write_str("init_month"),
            Grouping::InitSeason => f.write_str("init_season"),
            Grouping::Month(m) => write!(f, "{}", m),
        }
    }
}

impl FromStr for Grouping {
    type Err = SkillError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase();
        match key.as_str() {
            "init_month" | "month" => Ok(Grouping::InitMonth),
            "init_season" | "season" => Ok(Grouping::InitSeason),
            other => match other.parse::<u32>() {
                Ok(m) if (1..=12).contains(&m) => Ok(Grouping::Month(m)),
                _ => Err(SkillError::InvalidGrouping(s.to_string())),
            },
        }
    }
}

impl TryFrom<String> for Grouping {
    type Error = SkillError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Metric {
    /// Anomaly correlation coefficient.
    #[default]
    Acc,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Acc => "acc",
        }
    }
}

impl FromStr for Metric {
    type Err = SkillError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "acc" | "pearson_r" => Ok(Metric::Acc),
            other => Err(SkillError::UnsupportedMetric(other.to_string())),
        }
    }
}

impl TryFrom<String> for Metric {
    type Error = SkillError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
/// How ensemble members enter the paired samples.
pub enum MemberHandling {
    /// One sample per (init, lead): the mean of the finite members.
    #[default]
    Mean,
    /// Every finite member is a sample of its own.
    Pooled,
}

impl FromStr for MemberHandling {
    type Err = SkillError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mean" => Ok(MemberHandling::Mean),
            "pooled" => Ok(MemberHandling::Pooled),
            other => Err(SkillError::Config(format!(
                "unknown member handling `{}`, expected mean or pooled",
                other
            ))),
        }
    }
}

impl TryFrom<String> for MemberHandling {
    type Error = SkillError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Settings of one skill computation.
pub struct SkillConfig {
    pub lead_unit: LeadUnit,
    pub grouping: Option<Grouping>,
    pub metric: Metric,
    pub members: MemberHandling,
}

impl SkillConfig {
    pub fn new(lead_unit: LeadUnit) -> Self {
        SkillConfig {
            lead_unit,
            grouping: None,
            metric: Metric::Acc,
            members: MemberHandling::Mean,
        }
    }

    pub fn with_grouping(mut self, grouping: Option<Grouping>) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn with_members(mut self, members: MemberHandling) -> Self {
        self.members = members;
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Renaming map from the dimension names used here to the column names of
/// the input tables.
pub struct ColumnNames {
    pub init: String,
    pub lead: String,
    pub member: String,
    pub value: String,
    pub time: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        ColumnNames {
            init: "init".into(),
            lead: "lead".into(),
            member: "member".into(),
            value: "value".into(),
            time: "time".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Contents of the optional `config.toml`.
pub struct FileConfig {
    pub lead_unit: Option<LeadUnit>,
    pub grouping: Option<Grouping>,
    pub metric: Option<Metric>,
    pub members: Option<MemberHandling>,
    /// Calendar assumed for numeric time columns without a `calendar`
    /// attribute.
    pub calendar: Option<String>,
    pub columns: ColumnNames,
}

impl FileConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| SkillError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| SkillError::Config(format!("{}: {}", path.display(), e)))?;

        FileConfig::from_toml(&text)
    }

    /// `<config_dir>/s2s-skill/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("s2s-skill").join("config.toml"))
    }

    /// Loads `explicit` when given, otherwise the default file if present.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => FileConfig::load(path),
            None => match FileConfig::default_path() {
                Some(path) if path.is_file() => FileConfig::load(&path),
                _ => Ok(FileConfig::default()),
            },
        }
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn should_parse_grouping() {
        assert_eq!("init_month".parse::<Grouping>().unwrap(), Grouping::InitMonth);
        assert_eq!("season".parse::<Grouping>().unwrap(), Grouping::InitSeason);
        assert_eq!("3".parse::<Grouping>().unwrap(), Grouping::Month(3));
        assert!(matches!(
            "13".parse::<Grouping>(),
            Err(SkillError::InvalidGrouping(_))
        ));
        assert!("weekly".parse::<Grouping>().is_err());
    }

    #[test]
    fn should_label_groups() {
        assert_eq!(Grouping::InitMonth.keys().len(), 12);
        assert_eq!(Grouping::InitMonth.label(3), "03");
        assert_eq!(Grouping::InitSeason.label(2), "JJA");

        let dec = NaiveDate::from_ymd_opt(2020, 12, 1).unwrap();
        assert_eq!(Grouping::InitSeason.key_of(dec), 0);
        assert_eq!(Grouping::Month(12).key_of(dec), 12);
    }

    #[test]
    fn should_reject_unknown_metric() {
        assert_eq!("pearson_r".parse::<Metric>().unwrap(), Metric::Acc);
        assert!(matches!(
            "rmse".parse::<Metric>(),
            Err(SkillError::UnsupportedMetric(_))
        ));
    }

    #[test]
    fn should_read_toml() {
        let text = r#"
            lead_unit = "months"
            grouping = "init_month"
            members = "pooled"

            [columns]
            init = "S"
            lead = "L"
        "#;

        let config = FileConfig::from_toml(text).unwrap();

        assert_eq!(config.lead_unit, Some(LeadUnit::Months));
        assert_eq!(config.grouping, Some(Grouping::InitMonth));
        assert_eq!(config.members, Some(MemberHandling::Pooled));
        assert_eq!(config.metric, None);
        assert_eq!(config.columns.init, "S");
        assert_eq!(config.columns.lead, "L");
        assert_eq!(config.columns.value, "value");
    }

    #[test]
    fn should_reject_bad_toml_values() {
        assert!(matches!(
            FileConfig::from_toml(r#"lead_unit = "fortnights""#),
            Err(SkillError::Config(_))
        ));
        assert!(FileConfig::from_toml("unknown_key = 1").is_err());
    }

    #[test]
    fn should_load_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "lead_unit = \"days\"\ngrouping = \"7\"\n").unwrap();

        let config = FileConfig::discover(Some(&path)).unwrap();

        assert_eq!(config.lead_unit, Some(LeadUnit::Days));
        assert_eq!(config.grouping, Some(Grouping::Month(7)));
    }

    #[test]
    fn should_build_skill_config() {
        let config = SkillConfig::new(LeadUnit::Seasons)
            .with_grouping(Some(Grouping::InitSeason))
            .with_members(MemberHandling::Pooled);

        assert_eq!(config.metric, Metric::Acc);
        assert_eq!(config.grouping, Some(Grouping::InitSeason));
    }
}
