//! Running state of a single account projection

use crate::account::{IncomeProfile, ProjectionParameters};

/// State of an account at a point in time during projection
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Zero-based offset from the start year
    pub offset: u32,

    /// Calendar year being simulated
    pub year: i32,

    /// Participant age this year, if known
    pub age: Option<u32>,

    /// Income profile with this year's income
    pub income: Option<IncomeProfile>,

    /// Nominal balance at the end of the previous year
    pub prior_balance: f64,

    /// (1 + inflation)^offset
    pub deflator: f64,
}

impl ProjectionState {
    /// Initialize state for the first simulated year
    pub fn from_parameters(params: &ProjectionParameters) -> Self {
        Self {
            offset: 0,
            year: params.start_year,
            age: params.starting_age,
            income: params.income,
            prior_balance: params.starting_balance,
            deflator: 1.0,
        }
    }

    /// Carry the closing balance forward
    pub fn close_year(&mut self, nominal_balance: f64) {
        self.prior_balance = nominal_balance;
    }

    /// Advance to next year
    pub fn advance_year(&mut self, params: &ProjectionParameters) {
        self.offset += 1;
        self.year = params.year_at(self.offset);
        self.age = params.age_at(self.offset);

        if let Some(income) = self.income.as_mut() {
            income.income *= 1.0 + income.income_growth_rate;
        }

        // Recomputed from the start year rather than accumulated, so the
        // deflator stays exactly (1 + i)^offset
        self.deflator = (1.0 + params.annual_inflation_rate).powi(self.offset as i32);
    }

    /// Deflate a nominal amount to start-year dollars
    pub fn real_value(&self, nominal: f64) -> f64 {
        nominal / self.deflator
    }
}
