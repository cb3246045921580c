//! Skill values per lead, optionally per initialization group.

use std::fmt;

use crate::{config::Metric, lead::LeadUnit};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkillCell {
    /// Correlation in [-1, 1], NaN when undefined.
    pub value: f64,
    /// Paired samples that entered the correlation.
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillRow {
    /// Group label, `None` for an ungrouped result.
    pub group: Option<String>,
    pub cells: Vec<SkillCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillResult {
    pub metric: Metric,
    pub lead_unit: LeadUnit,
    pub leads: Vec<u32>,
    pub rows: Vec<SkillRow>,
}

impl SkillResult {
    pub fn is_grouped(&self) -> bool {
        self.rows.iter().any(|r| r.group.is_some())
    }

    /// Skill per lead of the first row, the whole result when ungrouped.
    pub fn values(&self) -> Vec<f64> {
        self.rows
            .first()
            .map(|row| row.cells.iter().map(|c| c.value).collect())
            .unwrap_or_default()
    }

    pub fn group(&self, label: &str) -> Option<&SkillRow> {
        self.rows
            .iter()
            .find(|row| row.group.as_deref() == Some(label))
    }

    pub fn group_labels(&self) -> Vec<&str> {
        self.rows.iter().filter_map(|r| r.group.as_deref()).collect()
    }
}

impl fmt::Display for SkillResult {
    /// Plain text table with one line per group and lead.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>8} {:>14} {:>9} {:>8}",
            "group",
            format!("lead ({})", self.lead_unit),
            self.metric.as_str(),
            "samples"
        )?;

        for row in &self.rows {
            let group = row.group.as_deref().unwrap_or("all");
            for (lead, cell) in self.leads.iter().zip(&row.cells) {
                writeln!(
                    f,
                    "{:>8} {:>14} {:>9.4} {:>8}",
                    group, lead, cell.value, cell.samples
                )?;
            }
        }

        Ok(())
    }
}
