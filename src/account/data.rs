//! Projection inputs: account type, filer profile and contribution choices

use serde::{Deserialize, Serialize};

use crate::assumptions::PhaseOutKind;
use crate::error::{ProjectionError, Result};

/// Age at which catch-up contributions become available
pub const CATCH_UP_AGE: u32 = 50;

/// Oldest accepted starting age
pub const MAX_STARTING_AGE: u32 = 150;

/// Tax-advantaged account being projected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Employer 401(k) elective deferrals
    Plan401k,
    /// Traditional IRA (deduction phases out when covered by a workplace plan)
    TraditionalIra,
    /// Roth IRA (eligibility phases out with income)
    RothIra,
}

impl AccountType {
    /// Whether income-based limits exist for this account at all
    pub fn accepts_income(&self) -> bool {
        !matches!(self, AccountType::Plan401k)
    }

    /// Phase-out applicable to this account for a given income profile
    pub fn phase_out_kind(&self, income: &IncomeProfile) -> Option<PhaseOutKind> {
        match self {
            AccountType::Plan401k => None,
            AccountType::RothIra => Some(PhaseOutKind::Roth),
            AccountType::TraditionalIra if income.covered_by_workplace_plan => {
                Some(PhaseOutKind::TraditionalDeduction)
            }
            AccountType::TraditionalIra => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Plan401k => "401k",
            AccountType::TraditionalIra => "TraditionalIRA",
            AccountType::RothIra => "RothIRA",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "401k" => Some(AccountType::Plan401k),
            "TraditionalIRA" => Some(AccountType::TraditionalIra),
            "RothIRA" => Some(AccountType::RothIra),
            _ => None,
        }
    }
}

/// Tax filing status used to select phase-out ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FilingStatus {
    Single,
    /// Married filing jointly
    Joint,
    /// Married filing separately, lived apart all year
    SeparateLivedApart,
}

impl FilingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilingStatus::Single => "Single",
            FilingStatus::Joint => "Joint",
            FilingStatus::SeparateLivedApart => "SeparateLivedApart",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Single" => Some(FilingStatus::Single),
            "Joint" => Some(FilingStatus::Joint),
            "SeparateLivedApart" => Some(FilingStatus::SeparateLivedApart),
            _ => None,
        }
    }
}

/// Income used for phase-out lookups
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeProfile {
    pub filing_status: FilingStatus,

    /// Modified adjusted gross income in the start year
    pub income: f64,

    /// Annual growth applied to income after each simulated year
    #[serde(default)]
    pub income_growth_rate: f64,

    /// Participant is covered by a workplace retirement plan
    #[serde(default)]
    pub covered_by_workplace_plan: bool,
}

impl IncomeProfile {
    pub fn new(filing_status: FilingStatus, income: f64) -> Self {
        Self {
            filing_status,
            income,
            income_growth_rate: 0.0,
            covered_by_workplace_plan: false,
        }
    }

    pub fn with_growth(mut self, income_growth_rate: f64) -> Self {
        self.income_growth_rate = income_growth_rate;
        self
    }

    pub fn covered_by_plan(mut self, covered: bool) -> Self {
        self.covered_by_workplace_plan = covered;
        self
    }
}

/// How much to contribute each year, always capped by the allowed limit
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ContributionStrategy {
    /// Contribute the full allowed limit
    #[default]
    Maximum,
    /// `amount * (1 + growth_rate)^years_elapsed`, clamped to the limit
    Fixed { amount: f64, growth_rate: f64 },
}

impl ContributionStrategy {
    /// Desired contribution before the limit is applied
    pub fn desired(&self, years_elapsed: u32, allowed: f64) -> f64 {
        match *self {
            ContributionStrategy::Maximum => allowed,
            ContributionStrategy::Fixed { amount, growth_rate } => {
                amount * (1.0 + growth_rate).powi(years_elapsed as i32)
            }
        }
    }
}

/// Consecutive calendar years with no contributions (e.g. full-time study)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionPause {
    pub start_year: i32,
    pub years: u32,
}

impl ContributionPause {
    pub fn contains(&self, year: i32) -> bool {
        year >= self.start_year && i64::from(year) < i64::from(self.start_year) + i64::from(self.years)
    }
}

/// Everything a single projection needs apart from the reference tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionParameters {
    /// Caller-supplied identifier carried into the result
    #[serde(default)]
    pub scenario_id: u32,

    pub account_type: AccountType,

    pub starting_balance: f64,

    /// First simulated calendar year
    pub start_year: i32,

    pub number_of_years: u32,

    /// Investment return applied to the prior balance each year
    pub annual_growth_rate: f64,

    /// Used to deflate balances back to start-year dollars
    pub annual_inflation_rate: f64,

    #[serde(default)]
    pub income: Option<IncomeProfile>,

    /// Age during the start year; enables catch-up contributions from 50
    #[serde(default)]
    pub starting_age: Option<u32>,

    #[serde(default)]
    pub strategy: ContributionStrategy,

    #[serde(default)]
    pub pause: Option<ContributionPause>,

    /// Replaces the growth rate of compounding limit tables
    #[serde(default)]
    pub limit_growth_rate: Option<f64>,
}

impl ProjectionParameters {
    /// Parameters that contribute the maximum every year with no income or age data
    pub fn new(
        account_type: AccountType,
        starting_balance: f64,
        start_year: i32,
        number_of_years: u32,
        annual_growth_rate: f64,
        annual_inflation_rate: f64,
    ) -> Self {
        Self {
            scenario_id: 0,
            account_type,
            starting_balance,
            start_year,
            number_of_years,
            annual_growth_rate,
            annual_inflation_rate,
            income: None,
            starting_age: None,
            strategy: ContributionStrategy::Maximum,
            pause: None,
            limit_growth_rate: None,
        }
    }

    pub fn with_scenario_id(mut self, scenario_id: u32) -> Self {
        self.scenario_id = scenario_id;
        self
    }

    pub fn with_income(mut self, income: IncomeProfile) -> Self {
        self.income = Some(income);
        self
    }

    pub fn with_starting_age(mut self, age: u32) -> Self {
        self.starting_age = Some(age);
        self
    }

    pub fn with_strategy(mut self, strategy: ContributionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_pause(mut self, pause: ContributionPause) -> Self {
        self.pause = Some(pause);
        self
    }

    pub fn with_limit_growth_rate(mut self, rate: f64) -> Self {
        self.limit_growth_rate = Some(rate);
        self
    }

    /// Calendar year for a zero-based offset
    pub fn year_at(&self, offset: u32) -> i32 {
        self.start_year + offset as i32
    }

    /// Participant age for a zero-based offset, if known
    pub fn age_at(&self, offset: u32) -> Option<u32> {
        self.starting_age.map(|age| age.saturating_add(offset))
    }

    pub fn end_year(&self) -> i32 {
        self.start_year + self.number_of_years as i32 - 1
    }

    /// Check numeric constraints before any year is simulated
    pub fn validate(&self) -> Result<()> {
        if self.number_of_years == 0 {
            return Err(ProjectionError::invalid("number_of_years must be greater than zero"));
        }
        if i32::try_from(self.number_of_years)
            .ok()
            .and_then(|n| self.start_year.checked_add(n))
            .is_none()
        {
            return Err(ProjectionError::invalid(format!(
                "{} years from {} overflows the calendar",
                self.number_of_years, self.start_year
            )));
        }
        if let Some(age) = self.starting_age {
            if age > MAX_STARTING_AGE || age.checked_add(self.number_of_years).is_none() {
                return Err(ProjectionError::invalid(format!(
                    "starting_age must be at most {}, got {}",
                    MAX_STARTING_AGE, age
                )));
            }
        }
        if !self.starting_balance.is_finite() || self.starting_balance < 0.0 {
            return Err(ProjectionError::invalid(format!(
                "starting_balance must be a non-negative number, got {}",
                self.starting_balance
            )));
        }
        if !self.annual_growth_rate.is_finite() {
            return Err(ProjectionError::invalid("annual_growth_rate must be finite"));
        }
        if !self.annual_inflation_rate.is_finite() || self.annual_inflation_rate <= -1.0 {
            return Err(ProjectionError::invalid(format!(
                "annual_inflation_rate must be finite and greater than -1, got {}",
                self.annual_inflation_rate
            )));
        }
        if let Some(rate) = self.limit_growth_rate {
            if !rate.is_finite() {
                return Err(ProjectionError::invalid("limit_growth_rate must be finite"));
            }
        }

        if let Some(income) = &self.income {
            if !self.account_type.accepts_income() {
                return Err(ProjectionError::invalid(format!(
                    "{} contributions have no income phase-out; income must not be supplied",
                    self.account_type.as_str()
                )));
            }
            if !income.income.is_finite() || income.income < 0.0 {
                return Err(ProjectionError::invalid(format!(
                    "income must be a non-negative number, got {}",
                    income.income
                )));
            }
            if !income.income_growth_rate.is_finite() {
                return Err(ProjectionError::invalid("income_growth_rate must be finite"));
            }
        }

        if let ContributionStrategy::Fixed { amount, growth_rate } = self.strategy {
            if !amount.is_finite() || amount < 0.0 {
                return Err(ProjectionError::invalid(format!(
                    "fixed contribution must be a non-negative number, got {}",
                    amount
                )));
            }
            if !growth_rate.is_finite() || growth_rate <= -1.0 {
                return Err(ProjectionError::invalid(format!(
                    "contribution growth rate must be finite and greater than -1, got {}",
                    growth_rate
                )));
            }
        }

        Ok(())
    }
}
