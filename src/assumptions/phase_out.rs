//! Income phase-out ranges for IRA contributions
//!
//! Roth IRA eligibility and the Traditional IRA deduction (for participants
//! covered by a workplace plan) shrink linearly across an income range that
//! depends on year and filing status.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::limits::{lookup_year, ExtrapolationPolicy, YearLookup};
use crate::account::FilingStatus;
use crate::error::{ProjectionError, Result};

/// Which phase-out a range belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PhaseOutKind {
    /// Roth IRA contribution eligibility
    Roth,
    /// Traditional IRA deduction when covered by a workplace plan
    TraditionalDeduction,
}

impl PhaseOutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseOutKind::Roth => "Roth",
            PhaseOutKind::TraditionalDeduction => "TraditionalDeduction",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Roth" => Some(PhaseOutKind::Roth),
            "TraditionalDeduction" => Some(PhaseOutKind::TraditionalDeduction),
            _ => None,
        }
    }
}

/// Income bounds of a phase-out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeRange {
    pub lower: f64,
    pub upper: f64,
}

impl IncomeRange {
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if !lower.is_finite() || !upper.is_finite() || lower < 0.0 || lower >= upper {
            return Err(ProjectionError::invalid(format!(
                "phase-out range requires 0 <= lower < upper, got [{}, {}]",
                lower, upper
            )));
        }
        Ok(Self { lower, upper })
    }
}

/// Linear reduction of a contribution limit between two income bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseOutRule {
    pub income_lower: f64,
    pub income_upper: f64,
    pub base_limit: f64,
}

impl PhaseOutRule {
    pub fn new(income_lower: f64, income_upper: f64, base_limit: f64) -> Result<Self> {
        let range = IncomeRange::new(income_lower, income_upper)?;
        if !base_limit.is_finite() || base_limit < 0.0 {
            return Err(ProjectionError::invalid(format!(
                "phase-out base limit must be non-negative, got {}",
                base_limit
            )));
        }
        Ok(Self::from_range(range, base_limit))
    }

    pub fn from_range(range: IncomeRange, base_limit: f64) -> Self {
        Self {
            income_lower: range.lower,
            income_upper: range.upper,
            base_limit,
        }
    }

    /// Full limit at or below the lower bound, zero at or above the upper bound,
    /// linear in between
    pub fn allowed_contribution(&self, income: f64) -> f64 {
        if income <= self.income_lower {
            self.base_limit
        } else if income >= self.income_upper {
            0.0
        } else {
            self.base_limit * (self.income_upper - income) / (self.income_upper - self.income_lower)
        }
    }
}

/// One row of phase-out history
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseOutEntry {
    pub year: i32,
    pub kind: PhaseOutKind,
    pub filing_status: FilingStatus,
    pub range: IncomeRange,
}

/// Phase-out ranges by (kind, filing status) and year
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseOutSchedule {
    ranges: HashMap<(PhaseOutKind, FilingStatus), BTreeMap<i32, IncomeRange>>,
    policy: ExtrapolationPolicy,
}

impl PhaseOutSchedule {
    /// Empty schedule
    pub fn new(policy: ExtrapolationPolicy) -> Self {
        Self {
            ranges: HashMap::new(),
            policy,
        }
    }

    /// Build from rows; duplicate (year, kind, status) rows are rejected
    pub fn from_entries(
        entries: impl IntoIterator<Item = PhaseOutEntry>,
        policy: ExtrapolationPolicy,
    ) -> Result<Self> {
        let mut schedule = Self::new(policy);
        for entry in entries {
            schedule.insert(entry)?;
        }
        Ok(schedule)
    }

    /// Published ranges. Later years move both bounds up by 10,000 per full decade.
    pub fn default_irs() -> Self {
        use FilingStatus::*;
        use PhaseOutKind::*;

        let rows = [
            (2024, Roth, Single, 146_000.0, 161_000.0),
            (2024, Roth, Joint, 230_000.0, 240_000.0),
            (2024, Roth, SeparateLivedApart, 0.0, 10_000.0),
            (2024, TraditionalDeduction, Single, 77_000.0, 87_000.0),
            (2024, TraditionalDeduction, Joint, 123_000.0, 143_000.0),
            (2024, TraditionalDeduction, SeparateLivedApart, 0.0, 10_000.0),
            (2025, Roth, Single, 150_000.0, 165_000.0),
            (2025, Roth, Joint, 230_000.0, 240_000.0),
            (2025, Roth, SeparateLivedApart, 0.0, 10_000.0),
            (2025, TraditionalDeduction, Single, 77_000.0, 87_000.0),
            (2025, TraditionalDeduction, Joint, 123_000.0, 143_000.0),
            (2025, TraditionalDeduction, SeparateLivedApart, 0.0, 10_000.0),
        ];

        let mut ranges: HashMap<_, BTreeMap<i32, IncomeRange>> = HashMap::new();
        for (year, kind, status, lower, upper) in rows {
            ranges
                .entry((kind, status))
                .or_default()
                .insert(year, IncomeRange { lower, upper });
        }

        Self {
            ranges,
            policy: Self::default_policy(),
        }
    }

    /// +10,000 on both bounds for each full decade past the last published year
    pub fn default_policy() -> ExtrapolationPolicy {
        ExtrapolationPolicy::Step {
            every_years: 10,
            increment: 10_000.0,
        }
    }

    pub fn insert(&mut self, entry: PhaseOutEntry) -> Result<()> {
        let history = self.ranges.entry((entry.kind, entry.filing_status)).or_default();
        if history.insert(entry.year, entry.range).is_some() {
            return Err(ProjectionError::invalid(format!(
                "duplicate {:?} phase-out range for {:?} in {}",
                entry.kind, entry.filing_status, entry.year
            )));
        }
        Ok(())
    }

    pub fn policy(&self) -> ExtrapolationPolicy {
        self.policy
    }

    /// Extrapolation used for one filing status. The separate-filer range is fixed.
    pub fn policy_for(&self, filing_status: FilingStatus) -> ExtrapolationPolicy {
        match filing_status {
            FilingStatus::SeparateLivedApart => ExtrapolationPolicy::HoldConstant,
            FilingStatus::Single | FilingStatus::Joint => self.policy,
        }
    }

    /// Number of (year, kind, status) rows
    pub fn len(&self) -> usize {
        self.ranges.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Income range for a year, extrapolated past the last published year
    pub fn range_for(&self, kind: PhaseOutKind, filing_status: FilingStatus, year: i32) -> Result<IncomeRange> {
        let history = self
            .ranges
            .get(&(kind, filing_status))
            .ok_or(ProjectionError::MissingPhaseOutRule {
                kind,
                filing_status,
                year,
            })?;

        let unsupported = || ProjectionError::UnsupportedYear {
            year,
            table: format!("{} phase-out ({:?})", kind.as_str(), filing_status),
        };

        match lookup_year(history, year) {
            YearLookup::Known(range) => Ok(range),
            YearLookup::BeforeHistory => Err(unsupported()),
            YearLookup::AfterHistory { last_year, last } => {
                let policy = self.policy_for(filing_status);
                let lower = policy.extrapolate(last_year, last.lower, year).ok_or_else(unsupported)?;
                let upper = policy.extrapolate(last_year, last.upper, year).ok_or_else(unsupported)?;
                Ok(IncomeRange { lower, upper })
            }
        }
    }

    /// Phase-out rule for a year applied to `base_limit`
    pub fn rule_for(
        &self,
        kind: PhaseOutKind,
        filing_status: FilingStatus,
        year: i32,
        base_limit: f64,
    ) -> Result<PhaseOutRule> {
        let range = self.range_for(kind, filing_status, year)?;
        Ok(PhaseOutRule::from_range(range, base_limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_income_at_lower_bound_gets_full_limit() {
        let rule = PhaseOutRule::new(146_000.0, 161_000.0, 7000.0).unwrap();
        assert_eq!(rule.allowed_contribution(146_000.0), 7000.0);
        assert_eq!(rule.allowed_contribution(50_000.0), 7000.0);
    }

    #[test]
    fn test_income_at_upper_bound_gets_zero() {
        let rule = PhaseOutRule::new(146_000.0, 161_000.0, 7000.0).unwrap();
        assert_eq!(rule.allowed_contribution(161_000.0), 0.0);
    }

    #[test]
    fn test_income_above_upper_bound_clamps_to_zero() {
        let rule = PhaseOutRule::new(146_000.0, 161_000.0, 7000.0).unwrap();
        assert_eq!(rule.allowed_contribution(200_000.0), 0.0);
    }

    #[test]
    fn test_linear_interpolation() {
        let rule = PhaseOutRule::new(150_000.0, 165_000.0, 7000.0).unwrap();
        assert_relative_eq!(rule.allowed_contribution(157_500.0), 3500.0, epsilon = 1e-9);
        assert_relative_eq!(rule.allowed_contribution(162_000.0), 7000.0 * 3.0 / 15.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_rule() {
        assert!(PhaseOutRule::new(10.0, 10.0, 7000.0).is_err());
        assert!(PhaseOutRule::new(20.0, 10.0, 7000.0).is_err());
        assert!(PhaseOutRule::new(10.0, 20.0, -1.0).is_err());
    }

    #[test]
    fn test_default_ranges() {
        let schedule = PhaseOutSchedule::default_irs();
        let range = schedule.range_for(PhaseOutKind::Roth, FilingStatus::Single, 2025).unwrap();
        assert_eq!(range, IncomeRange { lower: 150_000.0, upper: 165_000.0 });

        let range = schedule
            .range_for(PhaseOutKind::TraditionalDeduction, FilingStatus::Joint, 2024)
            .unwrap();
        assert_eq!(range, IncomeRange { lower: 123_000.0, upper: 143_000.0 });
        assert_eq!(schedule.len(), 12);
    }

    #[test]
    fn test_decade_extrapolation() {
        let schedule = PhaseOutSchedule::default_irs();
        let range = schedule.range_for(PhaseOutKind::Roth, FilingStatus::Single, 2034).unwrap();
        assert_eq!(range, IncomeRange { lower: 150_000.0, upper: 165_000.0 });

        let range = schedule.range_for(PhaseOutKind::Roth, FilingStatus::Single, 2035).unwrap();
        assert_eq!(range, IncomeRange { lower: 160_000.0, upper: 175_000.0 });

        let range = schedule.range_for(PhaseOutKind::Roth, FilingStatus::Joint, 2046).unwrap();
        assert_eq!(range, IncomeRange { lower: 250_000.0, upper: 260_000.0 });
    }

    #[test]
    fn test_separate_filer_range_is_fixed() {
        let schedule = PhaseOutSchedule::default_irs();
        for kind in [PhaseOutKind::Roth, PhaseOutKind::TraditionalDeduction] {
            for year in [2026, 2035, 2060] {
                let range = schedule.range_for(kind, FilingStatus::SeparateLivedApart, year).unwrap();
                assert_eq!(range, IncomeRange { lower: 0.0, upper: 10_000.0 });
            }
        }

        let rule = schedule
            .rule_for(PhaseOutKind::Roth, FilingStatus::SeparateLivedApart, 2035, 7000.0)
            .unwrap();
        assert_eq!(rule.allowed_contribution(12_000.0), 0.0);
    }

    #[test]
    fn test_missing_rule() {
        let schedule = PhaseOutSchedule::new(ExtrapolationPolicy::HoldConstant);
        assert_eq!(
            schedule.range_for(PhaseOutKind::Roth, FilingStatus::Single, 2025),
            Err(ProjectionError::MissingPhaseOutRule {
                kind: PhaseOutKind::Roth,
                filing_status: FilingStatus::Single,
                year: 2025,
            })
        );
    }

    #[test]
    fn test_year_before_history() {
        let schedule = PhaseOutSchedule::default_irs();
        assert!(matches!(
            schedule.range_for(PhaseOutKind::Roth, FilingStatus::Single, 2020),
            Err(ProjectionError::UnsupportedYear { year: 2020, .. })
        ));
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let entry = PhaseOutEntry {
            year: 2025,
            kind: PhaseOutKind::Roth,
            filing_status: FilingStatus::Single,
            range: IncomeRange::new(1.0, 2.0).unwrap(),
        };
        let result = PhaseOutSchedule::from_entries(vec![entry, entry], ExtrapolationPolicy::HoldConstant);
        assert!(result.is_err());
    }

    #[test]
    fn test_rule_for_uses_base_limit() {
        let schedule = PhaseOutSchedule::default_irs();
        let rule = schedule
            .rule_for(PhaseOutKind::Roth, FilingStatus::Single, 2024, 8000.0)
            .unwrap();
        assert_eq!(rule.income_lower, 146_000.0);
        assert_eq!(rule.income_upper, 161_000.0);
        assert_eq!(rule.base_limit, 8000.0);
        assert_eq!(rule.allowed_contribution(200_000.0), 0.0);
    }
}
