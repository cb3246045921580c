//! Forecast ensemble indexed by (init, lead, member).

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::NaiveDate;

use crate::{
    error::{Result, SkillError},
    lead::LeadUnit,
};

#[derive(Debug, Clone, PartialEq)]
/// One row of a long-format forecast table.
pub struct ForecastRecord {
    pub init: NaiveDate,
    pub lead: u32,
    pub member: i64,
    pub value: f64,
}

#[derive(Debug, Clone)]
pub struct ForecastEnsemble {
    inits: Vec<NaiveDate>,
    leads: Vec<u32>,
    members: usize,
    lead_unit: LeadUnit,
    /// Row-major over (init, lead, member). Missing values are NaN.
    values: Vec<f64>,
}

impl ForecastEnsemble {
    pub fn new(
        inits: Vec<NaiveDate>,
        leads: Vec<u32>,
        members: usize,
        lead_unit: LeadUnit,
        values: Vec<f64>,
    ) -> Result<Self> {
        check_leads(&leads)?;

        if members == 0 {
            return Err(SkillError::InvalidShape {
                expected: inits.len() * leads.len(),
                got: 0,
            });
        }

        let expected = inits.len() * leads.len() * members;
        if values.len() != expected {
            return Err(SkillError::InvalidShape {
                expected,
                got: values.len(),
            });
        }

        let mut seen = HashSet::with_capacity(inits.len());
        for init in &inits {
            if !seen.insert(*init) {
                return Err(SkillError::DuplicateInit(*init));
            }
        }

        Ok(ForecastEnsemble {
            inits,
            leads,
            members,
            lead_unit,
            values,
        })
    }

    /// Builds the dense array from long-format rows. Cells without a row
    /// are left missing.
    pub fn from_records(records: &[ForecastRecord], lead_unit: LeadUnit) -> Result<Self> {
        let inits: Vec<NaiveDate> = records
            .iter()
            .map(|r| r.init)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let leads: Vec<u32> = records
            .iter()
            .map(|r| r.lead)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let members: Vec<i64> = records
            .iter()
            .map(|r| r.member)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        check_leads(&leads)?;

        let init_index: HashMap<NaiveDate, usize> =
            inits.iter().enumerate().map(|(i, d)| (*d, i)).collect();
        let member_index: HashMap<i64, usize> =
            members.iter().enumerate().map(|(i, m)| (*m, i)).collect();

        let n_leads = leads.len();
        let n_members = members.len();
        let mut values = vec![f64::NAN; inits.len() * n_leads * n_members];
        let mut filled = vec![false; values.len()];

        for r in records {
            let idx = (init_index[&r.init] * n_leads + r.lead as usize) * n_members
                + member_index[&r.member];
            if filled[idx] {
                return Err(SkillError::DuplicateRecord {
                    init: r.init,
                    lead: r.lead,
                    member: r.member,
                });
            }
            filled[idx] = true;
            values[idx] = r.value;
        }

        ForecastEnsemble::new(inits, leads, n_members, lead_unit, values)
    }

    pub fn inits(&self) -> &[NaiveDate] {
        &self.inits
    }

    pub fn leads(&self) -> &[u32] {
        &self.leads
    }

    pub fn lead_unit(&self) -> LeadUnit {
        self.lead_unit
    }

    pub fn n_members(&self) -> usize {
        self.members
    }

    /// Member values of one (init, lead) cell.
    pub fn members(&self, init: usize, lead: usize) -> &[f64] {
        let start = (init * self.leads.len() + lead) * self.members;
        &self.values[start..start + self.members]
    }
}

/// Leads must be 0, 1, 2, ... without gaps.
fn check_leads(leads: &[u32]) -> Result<()> {
    if leads.is_empty() {
        return Err(SkillError::InvalidLeads("no lead offsets".to_string()));
    }

    for (expected, lead) in leads.iter().enumerate() {
        if *lead as usize != expected {
            return Err(SkillError::InvalidLeads(format!(
                "leads must be contiguous from 0, found {} at position {}",
                lead, expected
            )));
        }
    }

    Ok(())
}

// -- Tests -------------------------------------------------------------------
