//! Core projection engine for annual contribution and growth projections

use log::debug;

use super::records::{ProjectionResult, YearRecord};
use super::state::ProjectionState;
use crate::account::ProjectionParameters;
use crate::assumptions::Assumptions;
use crate::error::Result;

/// Main projection engine
///
/// Holds read-only reference tables; every call to [`ProjectionEngine::project`]
/// is independent, so one engine can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    assumptions: Assumptions,
}

impl ProjectionEngine {
    /// Create a new projection engine over the given assumptions
    pub fn new(assumptions: Assumptions) -> Self {
        Self { assumptions }
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    /// Run a projection, one record per year.
    ///
    /// Each year grows the prior balance first and then adds the contribution.
    /// Nothing is returned if any year fails.
    pub fn project(&self, params: &ProjectionParameters) -> Result<ProjectionResult> {
        params.validate()?;

        let mut result = ProjectionResult::new(params.scenario_id, params.account_type, params.starting_balance);
        result.records.reserve(params.number_of_years as usize);

        let mut state = ProjectionState::from_parameters(params);

        for offset in 0..params.number_of_years {
            if offset > 0 {
                state.advance_year(params);
            }

            let record = self.calculate_year(params, &mut state)?;
            result.add_record(record);
        }

        Ok(result)
    }

    /// Calculate a single year and carry its closing balance forward
    fn calculate_year(&self, params: &ProjectionParameters, state: &mut ProjectionState) -> Result<YearRecord> {
        let limit = self.assumptions.contribution_limit(
            params.account_type,
            state.year,
            state.age,
            state.income.as_ref(),
            params.limit_growth_rate,
        )?;

        let contribution = self.choose_contribution(params, state, limit.allowed);

        let grown = state.prior_balance * (1.0 + params.annual_growth_rate);
        let growth_amount = grown - state.prior_balance;
        let nominal_balance = grown + contribution;
        let real_balance = state.real_value(nominal_balance);

        debug!(
            "{} {}: limit={:.2} contribution={:.2} growth={:.2} nominal={:.2} real={:.2}",
            params.account_type.as_str(),
            state.year,
            limit.allowed,
            contribution,
            growth_amount,
            nominal_balance,
            real_balance
        );

        state.close_year(nominal_balance);

        Ok(YearRecord {
            year: state.year,
            age: state.age,
            income: state.income.map(|i| i.income),
            contribution_limit: limit.allowed,
            contribution_applied: contribution,
            growth_amount,
            nominal_balance,
            real_balance,
        })
    }

    /// Strategy amount capped at the allowed limit; zero during a pause
    fn choose_contribution(&self, params: &ProjectionParameters, state: &ProjectionState, allowed: f64) -> f64 {
        if params.pause.is_some_and(|pause| pause.contains(state.year)) {
            return 0.0;
        }
        params.strategy.desired(state.offset, allowed).min(allowed).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{
        AccountType, ContributionPause, ContributionStrategy, FilingStatus, IncomeProfile,
    };
    use crate::assumptions::{ContributionLimitTable, ExtrapolationPolicy};
    use crate::error::ProjectionError;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn engine() -> ProjectionEngine {
        ProjectionEngine::new(Assumptions::default_irs())
    }

    fn flat_ira_engine(limit: f64) -> ProjectionEngine {
        let mut assumptions = Assumptions::default_irs();
        assumptions.ira.base =
            ContributionLimitTable::new("flat IRA", vec![(2000, limit)], ExtrapolationPolicy::HoldConstant).unwrap();
        ProjectionEngine::new(assumptions)
    }

    fn no_contributions() -> ContributionStrategy {
        ContributionStrategy::Fixed {
            amount: 0.0,
            growth_rate: 0.0,
        }
    }

    #[test]
    fn test_flat_limit_growth_then_contribute() {
        let params = ProjectionParameters::new(AccountType::RothIra, 0.0, 2024, 3, 0.05, 0.0);
        let result = flat_ira_engine(7000.0).project(&params).unwrap();

        let balances = result.nominal_balances();
        assert_eq!(balances.len(), 3);
        assert_abs_diff_eq!(balances[0], 7000.00, epsilon = 1e-9);
        assert_abs_diff_eq!(balances[1], 14350.00, epsilon = 1e-9);
        assert_abs_diff_eq!(balances[2], 22067.50, epsilon = 1e-9);
    }

    #[test]
    fn test_default_ira_table_matches_flat_scenario() {
        // 2024-2026 all resolve to 7000 in the built-in IRA table
        let params = ProjectionParameters::new(AccountType::RothIra, 0.0, 2024, 3, 0.05, 0.0);
        let result = engine().project(&params).unwrap();
        assert_abs_diff_eq!(result.records[2].nominal_balance, 22067.50, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_years_is_invalid() {
        let params = ProjectionParameters::new(AccountType::RothIra, 0.0, 2024, 0, 0.05, 0.0);
        assert!(matches!(
            engine().project(&params),
            Err(ProjectionError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_negative_starting_balance_is_invalid() {
        let params = ProjectionParameters::new(AccountType::Plan401k, -5.0, 2024, 3, 0.05, 0.0);
        assert!(matches!(
            engine().project(&params),
            Err(ProjectionError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_overflowing_starting_age_is_invalid() {
        let params = ProjectionParameters::new(AccountType::Plan401k, 0.0, 2025, 2, 0.05, 0.0).with_starting_age(u32::MAX);
        assert!(matches!(
            engine().project(&params),
            Err(ProjectionError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_income_on_401k_is_invalid() {
        let params = ProjectionParameters::new(AccountType::Plan401k, 0.0, 2024, 3, 0.05, 0.0)
            .with_income(IncomeProfile::new(FilingStatus::Single, 90_000.0));
        assert!(matches!(
            engine().project(&params),
            Err(ProjectionError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_missing_phase_out_rule_fails_without_partial_result() {
        let mut assumptions = Assumptions::default_irs();
        assumptions.phase_outs = crate::assumptions::PhaseOutSchedule::new(ExtrapolationPolicy::HoldConstant);
        let params = ProjectionParameters::new(AccountType::RothIra, 0.0, 2025, 5, 0.05, 0.0)
            .with_income(IncomeProfile::new(FilingStatus::Joint, 90_000.0));
        assert!(matches!(
            ProjectionEngine::new(assumptions).project(&params),
            Err(ProjectionError::MissingPhaseOutRule { .. })
        ));
    }

    #[test]
    fn test_unsupported_year() {
        let params = ProjectionParameters::new(AccountType::RothIra, 0.0, 2019, 5, 0.05, 0.0);
        assert!(matches!(
            engine().project(&params),
            Err(ProjectionError::UnsupportedYear { year: 2019, .. })
        ));
    }

    #[test]
    fn test_income_above_range_contributes_nothing() {
        let params = ProjectionParameters::new(AccountType::RothIra, 10_000.0, 2024, 1, 0.05, 0.0)
            .with_income(IncomeProfile::new(FilingStatus::Single, 200_000.0));
        let result = engine().project(&params).unwrap();
        let record = &result.records[0];
        assert_eq!(record.contribution_limit, 0.0);
        assert_eq!(record.contribution_applied, 0.0);
        assert_abs_diff_eq!(record.nominal_balance, 10_500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_income_growth_pushes_into_phase_out() {
        let params = ProjectionParameters::new(AccountType::RothIra, 0.0, 2025, 3, 0.0, 0.0)
            .with_income(IncomeProfile::new(FilingStatus::Single, 150_000.0).with_growth(0.05));
        let result = engine().project(&params).unwrap();

        assert_eq!(result.records[0].contribution_applied, 7000.0);
        // 157,500 is halfway through the 150k-165k range
        assert_relative_eq!(result.records[1].income.unwrap(), 157_500.0, epsilon = 1e-6);
        assert_relative_eq!(result.records[1].contribution_applied, 3500.0, epsilon = 1e-6);
        // 165,375 is above the range
        assert_eq!(result.records[2].contribution_applied, 0.0);
    }

    #[test]
    fn test_catch_up_starts_at_fifty() {
        let params = ProjectionParameters::new(AccountType::Plan401k, 0.0, 2023, 3, 0.0, 0.0).with_starting_age(48);
        let result = engine().project(&params).unwrap();
        let contributions: Vec<f64> = result.records.iter().map(|r| r.contribution_applied).collect();
        assert_eq!(contributions, vec![22500.0, 23000.0, 23500.0 + 7500.0]);
        assert_eq!(result.records[2].age, Some(50));
    }

    #[test]
    fn test_pause_years_contribute_nothing() {
        let params = ProjectionParameters::new(AccountType::TraditionalIra, 0.0, 2024, 4, 0.0, 0.0).with_pause(
            ContributionPause {
                start_year: 2025,
                years: 2,
            },
        );
        let result = engine().project(&params).unwrap();
        let contributions: Vec<f64> = result.records.iter().map(|r| r.contribution_applied).collect();
        // 2027 is the first stepped-up IRA limit past the table
        assert_eq!(contributions, vec![7000.0, 0.0, 0.0, 7500.0]);
        // the limit itself is still reported
        assert_eq!(result.records[1].contribution_limit, 7000.0);
    }

    #[test]
    fn test_fixed_strategy_clamped_to_limit() {
        let params = ProjectionParameters::new(AccountType::RothIra, 0.0, 2024, 2, 0.0, 0.0).with_strategy(
            ContributionStrategy::Fixed {
                amount: 5000.0,
                growth_rate: 0.50,
            },
        );
        let result = engine().project(&params).unwrap();
        assert_eq!(result.records[0].contribution_applied, 5000.0);
        // 7500 wanted, 7000 allowed
        assert_eq!(result.records[1].contribution_applied, 7000.0);
    }

    #[test]
    fn test_real_balance_deflates_from_start_year() {
        let params = ProjectionParameters::new(AccountType::RothIra, 0.0, 2024, 3, 0.05, 0.10);
        let result = flat_ira_engine(7000.0).project(&params).unwrap();

        assert_abs_diff_eq!(result.records[0].real_balance, 7000.0, epsilon = 1e-9);
        assert_relative_eq!(result.records[1].real_balance, 14350.0 / 1.1, epsilon = 1e-12);
        assert_relative_eq!(result.records[2].real_balance, 22067.5 / 1.1_f64.powi(2), epsilon = 1e-12);
    }

    #[test]
    fn test_growth_applied_to_prior_balance_only() {
        let params = ProjectionParameters::new(AccountType::RothIra, 1000.0, 2024, 1, 0.10, 0.0);
        let result = flat_ira_engine(7000.0).project(&params).unwrap();
        let record = &result.records[0];
        assert_relative_eq!(record.growth_amount, 100.0, epsilon = 1e-9);
        assert_relative_eq!(record.nominal_balance, 8100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_negative_growth_allowed() {
        let params = ProjectionParameters::new(AccountType::Plan401k, 100_000.0, 2025, 2, -0.20, 0.02)
            .with_strategy(no_contributions());
        let result = engine().project(&params).unwrap();
        assert_relative_eq!(result.records[1].nominal_balance, 64_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_long_401k_projection_runs() {
        let params = ProjectionParameters::new(AccountType::Plan401k, 50_000.0, 2025, 40, 0.07, 0.03).with_starting_age(25);
        let result = engine().project(&params).unwrap();
        assert_eq!(result.records.len(), 40);
        assert_eq!(result.records.last().unwrap().year, 2064);
        assert!(result.summary().final_nominal > result.summary().final_real);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_zero_contributions_compound_exactly(
            start in 0u32..2_000_000,
            growth_bps in 0u32..2000,
            years in 1u32..60
        ) {
            let starting_balance = start as f64;
            let g = growth_bps as f64 / 10_000.0;
            let params = ProjectionParameters::new(AccountType::Plan401k, starting_balance, 2025, years, g, 0.02)
                .with_strategy(no_contributions());

            let result = engine().project(&params).unwrap();
            let expected = starting_balance * (1.0 + g).powi(years as i32);
            let actual = result.records.last().unwrap().nominal_balance;
            prop_assert!((actual - expected).abs() <= 1e-9 * expected.max(1.0));
        }

        #[test]
        fn prop_real_never_exceeds_nominal_with_positive_inflation(
            start in 0u32..500_000,
            growth_bps in 0u32..1500,
            inflation_bps in 1u32..1000,
            years in 1u32..50
        ) {
            let params = ProjectionParameters::new(
                AccountType::TraditionalIra,
                start as f64,
                2024,
                years,
                growth_bps as f64 / 10_000.0,
                inflation_bps as f64 / 10_000.0,
            );
            let result = engine().project(&params).unwrap();
            for record in &result.records {
                prop_assert!(record.real_balance <= record.nominal_balance);
            }
        }

        #[test]
        fn prop_nominal_non_decreasing_and_bounded_by_limit(
            start in 0u32..500_000,
            growth_bps in 0u32..1500,
            years in 1u32..40,
            age in 20u32..70,
            income in 0u32..300_000
        ) {
            let params = ProjectionParameters::new(
                AccountType::RothIra,
                start as f64,
                2024,
                years,
                growth_bps as f64 / 10_000.0,
                0.03,
            )
            .with_starting_age(age)
            .with_income(IncomeProfile::new(FilingStatus::Joint, income as f64).with_growth(0.03));

            let result = engine().project(&params).unwrap();
            prop_assert_eq!(result.records.len(), years as usize);

            let mut prior = start as f64;
            for record in &result.records {
                prop_assert!(record.contribution_applied <= record.contribution_limit);
                prop_assert!(record.contribution_applied >= 0.0);
                prop_assert!(record.nominal_balance >= prior);
                prior = record.nominal_balance;
            }
        }

        #[test]
        fn prop_projection_is_idempotent(
            start in 0u32..500_000,
            growth_bps in 0u32..1500,
            years in 1u32..40
        ) {
            let params = ProjectionParameters::new(
                AccountType::Plan401k,
                start as f64,
                2025,
                years,
                growth_bps as f64 / 10_000.0,
                0.025,
            )
            .with_starting_age(45);
            let engine = engine();
            prop_assert_eq!(engine.project(&params).unwrap(), engine.project(&params).unwrap());
        }
    }
}
