//! Scenario runner for batch projections
//!
//! Pre-loads assumptions once, then runs many projections against them
//! without re-reading CSV files.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::account::ProjectionParameters;
use crate::assumptions::Assumptions;
use crate::error::{LoadError, ProjectionError, Result};
use crate::projection::{ProjectionEngine, ProjectionResult};

/// Household totals across several accounts for one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedYear {
    pub year: i32,
    pub accounts: usize,
    pub contribution: f64,
    pub growth: f64,
    pub nominal_balance: f64,
    pub real_balance: f64,
}

/// Pre-loaded scenario runner for batch projections
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_csv()?;
///
/// for rate in [0.05, 0.07, 0.09] {
///     let params = ProjectionParameters::new(AccountType::RothIra, 0.0, 2025, 30, rate, 0.03);
///     let result = runner.run(&params)?;
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    engine: ProjectionEngine,
}

impl ScenarioRunner {
    /// Create runner with the built-in published limits
    pub fn new() -> Self {
        Self::with_assumptions(Assumptions::default_irs())
    }

    /// Create runner by loading assumptions from CSV files
    pub fn from_csv() -> std::result::Result<Self, LoadError> {
        Ok(Self::with_assumptions(Assumptions::from_csv()?))
    }

    /// Create runner from specific assumptions directory
    pub fn from_csv_path(path: &std::path::Path) -> std::result::Result<Self, LoadError> {
        Ok(Self::with_assumptions(Assumptions::from_csv_path(path)?))
    }

    /// Create runner with pre-built assumptions
    pub fn with_assumptions(assumptions: Assumptions) -> Self {
        Self {
            engine: ProjectionEngine::new(assumptions),
        }
    }

    pub fn assumptions(&self) -> &Assumptions {
        self.engine.assumptions()
    }

    /// Run a single projection
    pub fn run(&self, params: &ProjectionParameters) -> Result<ProjectionResult> {
        self.engine.project(params)
    }

    /// Run projections in parallel; results line up with `scenarios`
    pub fn run_batch(&self, scenarios: &[ProjectionParameters]) -> Vec<Result<ProjectionResult>> {
        log::info!("Running {} projections", scenarios.len());
        scenarios.par_iter().map(|params| self.engine.project(params)).collect()
    }

    /// Same scenario under different investment growth rates
    pub fn run_growth_sweep(&self, params: &ProjectionParameters, growth_rates: &[f64]) -> Result<Vec<ProjectionResult>> {
        growth_rates
            .iter()
            .map(|&rate| {
                let mut scenario = params.clone();
                scenario.annual_growth_rate = rate;
                self.engine.project(&scenario)
            })
            .collect()
    }

    /// Project several accounts over the same years and sum them per year
    pub fn run_combined(&self, accounts: &[ProjectionParameters]) -> Result<Vec<CombinedYear>> {
        let Some(first) = accounts.first() else {
            return Err(ProjectionError::invalid("at least one account is required"));
        };

        if let Some(mismatch) = accounts
            .iter()
            .find(|a| a.start_year != first.start_year || a.number_of_years != first.number_of_years)
        {
            return Err(ProjectionError::invalid(format!(
                "scenario {} covers {}-{} but scenario {} covers {}-{}",
                mismatch.scenario_id,
                mismatch.start_year,
                mismatch.end_year(),
                first.scenario_id,
                first.start_year,
                first.end_year()
            )));
        }

        let results = self.run_batch(accounts).into_iter().collect::<Result<Vec<_>>>()?;

        let mut combined: Vec<CombinedYear> = (0..first.number_of_years)
            .map(|offset| CombinedYear {
                year: first.year_at(offset),
                accounts: results.len(),
                contribution: 0.0,
                growth: 0.0,
                nominal_balance: 0.0,
                real_balance: 0.0,
            })
            .collect();

        for result in &results {
            for (total, record) in combined.iter_mut().zip(&result.records) {
                total.contribution += record.contribution_applied;
                total.growth += record.growth_amount;
                total.nominal_balance += record.nominal_balance;
                total.real_balance += record.real_balance;
            }
        }

        Ok(combined)
    }
}
