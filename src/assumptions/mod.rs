//! Contribution limit and phase-out reference data

mod limits;
mod phase_out;
pub mod loader;

pub use limits::{round_to_nearest, ContributionLimitTable, ExtrapolationPolicy};
pub use phase_out::{IncomeRange, PhaseOutEntry, PhaseOutKind, PhaseOutRule, PhaseOutSchedule};
pub use loader::LoadedAssumptions;

use std::path::Path;

use crate::account::{AccountType, IncomeProfile, CATCH_UP_AGE};
use crate::error::{LoadError, Result};

/// Projected limits are rounded to this increment, as the IRS publishes them
pub const LIMIT_ROUNDING: f64 = 500.0;

/// Fallback limit growth when a table is too short to derive one
pub const DEFAULT_LIMIT_GROWTH_RATE: f64 = 0.03;

/// Published 401(k) elective deferral limits
const HISTORICAL_401K_LIMITS: [(i32, f64); 20] = [
    (2006, 15000.0),
    (2007, 15500.0),
    (2008, 15500.0),
    (2009, 16500.0),
    (2010, 16500.0),
    (2011, 16500.0),
    (2012, 17000.0),
    (2013, 17500.0),
    (2014, 17500.0),
    (2015, 18000.0),
    (2016, 18000.0),
    (2017, 18000.0),
    (2018, 18500.0),
    (2019, 19000.0),
    (2020, 19500.0),
    (2021, 19500.0),
    (2022, 20500.0),
    (2023, 22500.0),
    (2024, 23000.0),
    (2025, 23500.0),
];

/// Published 401(k) catch-up limits (age 50+)
const HISTORICAL_401K_CATCH_UP: [(i32, f64); 20] = [
    (2006, 5000.0),
    (2007, 5000.0),
    (2008, 5000.0),
    (2009, 5500.0),
    (2010, 5500.0),
    (2011, 5500.0),
    (2012, 5500.0),
    (2013, 5500.0),
    (2014, 5500.0),
    (2015, 6000.0),
    (2016, 6000.0),
    (2017, 6000.0),
    (2018, 6000.0),
    (2019, 6000.0),
    (2020, 6500.0),
    (2021, 6500.0),
    (2022, 6750.0),
    (2023, 7500.0),
    (2024, 7500.0),
    (2025, 7500.0),
];

const HISTORICAL_IRA_LIMITS: [(i32, f64); 4] = [
    (2022, 6000.0),
    (2023, 6500.0),
    (2024, 7000.0),
    (2025, 7000.0),
];

const HISTORICAL_IRA_CATCH_UP: [(i32, f64); 1] = [(2022, 1000.0)];

/// Base and catch-up limits for one family of accounts
#[derive(Debug, Clone, PartialEq)]
pub struct AccountLimits {
    pub base: ContributionLimitTable,
    pub catch_up: ContributionLimitTable,
}

impl AccountLimits {
    /// 401(k) tables compounding at their historical growth rate, rounded to 500
    pub fn plan_401k_from(base: &[(i32, f64)], catch_up: &[(i32, f64)]) -> Result<Self> {
        let base = ContributionLimitTable::new("401(k)", base.iter().copied(), ExtrapolationPolicy::HoldConstant)?;
        let rate = base
            .historical_growth_rate(Some(LIMIT_ROUNDING))
            .unwrap_or(DEFAULT_LIMIT_GROWTH_RATE);
        let policy = ExtrapolationPolicy::Compound {
            rate,
            round_to: Some(LIMIT_ROUNDING),
        };

        Ok(Self {
            base: base.with_policy(policy),
            catch_up: ContributionLimitTable::new("401(k) catch-up", catch_up.iter().copied(), policy)?,
        })
    }

    /// IRA tables: base limit rises 500 every two years, catch-up held flat
    pub fn ira_from(base: &[(i32, f64)], catch_up: &[(i32, f64)]) -> Result<Self> {
        Ok(Self {
            base: ContributionLimitTable::new(
                "IRA",
                base.iter().copied(),
                ExtrapolationPolicy::Step {
                    every_years: 2,
                    increment: LIMIT_ROUNDING,
                },
            )?,
            catch_up: ContributionLimitTable::new(
                "IRA catch-up",
                catch_up.iter().copied(),
                ExtrapolationPolicy::HoldConstant,
            )?,
        })
    }
}

/// Limits that apply to one account in one year
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitBreakdown {
    pub base_limit: f64,
    pub catch_up: f64,
    /// Rule that reduced the limit, when income applied
    pub phase_out: Option<PhaseOutRule>,
    /// Final amount that may be contributed
    pub allowed: f64,
}

impl LimitBreakdown {
    pub fn before_phase_out(&self) -> f64 {
        self.base_limit + self.catch_up
    }
}

/// Container for all reference tables used by projections
#[derive(Debug, Clone, PartialEq)]
pub struct Assumptions {
    pub plan_401k: AccountLimits,
    pub ira: AccountLimits,
    pub phase_outs: PhaseOutSchedule,
}

impl Assumptions {
    /// Built-in published limits and phase-out ranges
    pub fn default_irs() -> Self {
        Self::build(
            &HISTORICAL_401K_LIMITS,
            &HISTORICAL_401K_CATCH_UP,
            &HISTORICAL_IRA_LIMITS,
            &HISTORICAL_IRA_CATCH_UP,
            PhaseOutSchedule::default_irs(),
        )
        .expect("built-in limit tables are valid")
    }

    /// Load assumptions from CSV files in the default location (data/assumptions/)
    pub fn from_csv() -> std::result::Result<Self, LoadError> {
        Self::from_csv_path(Path::new(loader::DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load assumptions from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> std::result::Result<Self, LoadError> {
        let loaded = LoadedAssumptions::load_from(path)?;
        Self::from_loaded(loaded)
    }

    pub fn from_loaded(loaded: LoadedAssumptions) -> std::result::Result<Self, LoadError> {
        let phase_outs = PhaseOutSchedule::from_entries(loaded.phase_outs, PhaseOutSchedule::default_policy())?;
        Ok(Self::build(
            &loaded.limits_401k,
            &loaded.catch_up_401k,
            &loaded.limits_ira,
            &loaded.catch_up_ira,
            phase_outs,
        )?)
    }

    fn build(
        limits_401k: &[(i32, f64)],
        catch_up_401k: &[(i32, f64)],
        limits_ira: &[(i32, f64)],
        catch_up_ira: &[(i32, f64)],
        phase_outs: PhaseOutSchedule,
    ) -> Result<Self> {
        Ok(Self {
            plan_401k: AccountLimits::plan_401k_from(limits_401k, catch_up_401k)?,
            ira: AccountLimits::ira_from(limits_ira, catch_up_ira)?,
            phase_outs,
        })
    }

    /// Limit tables for an account type. Traditional and Roth IRAs share one limit.
    pub fn limits(&self, account_type: AccountType) -> &AccountLimits {
        match account_type {
            AccountType::Plan401k => &self.plan_401k,
            AccountType::TraditionalIra | AccountType::RothIra => &self.ira,
        }
    }

    /// Contribution limit for one account and year.
    ///
    /// Catch-up is added when `age` is at least 50. When `income` is given and the
    /// account phases out for that profile, the combined limit is reduced linearly
    /// across the year's income range. `limit_growth_rate` replaces the rate of
    /// compounding tables for years past their history.
    pub fn contribution_limit(
        &self,
        account_type: AccountType,
        year: i32,
        age: Option<u32>,
        income: Option<&IncomeProfile>,
        limit_growth_rate: Option<f64>,
    ) -> Result<LimitBreakdown> {
        let limits = self.limits(account_type);

        let base_limit = match limit_growth_rate {
            Some(rate) => limits.base.limit_with_policy(year, &limits.base.policy().with_rate(rate))?,
            None => limits.base.limit_for(year)?,
        };

        let catch_up = match age {
            Some(age) if age >= CATCH_UP_AGE => match limit_growth_rate {
                Some(rate) => limits
                    .catch_up
                    .limit_with_policy(year, &limits.catch_up.policy().with_rate(rate))?,
                None => limits.catch_up.limit_for(year)?,
            },
            _ => 0.0,
        };

        let combined = base_limit + catch_up;

        let phase_out = match income {
            Some(profile) => match account_type.phase_out_kind(profile) {
                Some(kind) => Some(self.phase_outs.rule_for(kind, profile.filing_status, year, combined)?),
                None => None,
            },
            None => None,
        };

        let allowed = match (&phase_out, income) {
            (Some(rule), Some(profile)) => rule.allowed_contribution(profile.income),
            _ => combined,
        };

        Ok(LimitBreakdown {
            base_limit,
            catch_up,
            phase_out,
            allowed,
        })
    }
}

impl Default for Assumptions {
    fn default() -> Self {
        Self::default_irs()
    }
}
