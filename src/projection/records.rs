//! Output structures for projections

use serde::{Deserialize, Serialize};

use crate::account::AccountType;

/// Account state at the end of one simulated year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    pub year: i32,
    pub age: Option<u32>,

    /// Income used for the phase-out lookup this year
    pub income: Option<f64>,

    /// Allowed contribution after catch-up and phase-out
    pub contribution_limit: f64,
    pub contribution_applied: f64,

    /// Growth credited on the prior year's balance
    pub growth_amount: f64,

    pub nominal_balance: f64,

    /// Nominal balance deflated to start-year dollars
    pub real_balance: f64,
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub scenario_id: u32,
    pub account_type: AccountType,
    pub starting_balance: f64,

    /// One record per simulated year, chronological
    pub records: Vec<YearRecord>,
}

impl ProjectionResult {
    pub fn new(scenario_id: u32, account_type: AccountType, starting_balance: f64) -> Self {
        Self {
            scenario_id,
            account_type,
            starting_balance,
            records: Vec::new(),
        }
    }

    pub fn add_record(&mut self, record: YearRecord) {
        self.records.push(record);
    }

    pub fn nominal_balances(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.nominal_balance).collect()
    }

    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let total_contributions: f64 = self.records.iter().map(|r| r.contribution_applied).sum();
        let total_growth: f64 = self.records.iter().map(|r| r.growth_amount).sum();

        let final_nominal = self
            .records
            .last()
            .map(|r| r.nominal_balance)
            .unwrap_or(self.starting_balance);
        let final_real = self
            .records
            .last()
            .map(|r| r.real_balance)
            .unwrap_or(self.starting_balance);

        ProjectionSummary {
            scenario_id: self.scenario_id,
            account_type: self.account_type,
            total_years: self.records.len() as u32,
            first_year: self.records.first().map(|r| r.year),
            last_year: self.records.last().map(|r| r.year),
            starting_balance: self.starting_balance,
            total_contributions,
            total_growth,
            final_nominal,
            final_real,
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub scenario_id: u32,
    pub account_type: AccountType,
    pub total_years: u32,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    pub starting_balance: f64,
    pub total_contributions: f64,
    pub total_growth: f64,
    pub final_nominal: f64,
    pub final_real: f64,
}
