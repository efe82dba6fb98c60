//! Load projection scenarios from scenarios.csv

use super::{AccountType, ContributionPause, FilingStatus, IncomeProfile, ProjectionParameters};
use crate::error::LoadError;
use csv::Reader;
use std::path::Path;

/// Default location of the scenario batch
pub const DEFAULT_SCENARIOS_PATH: &str = "data/scenarios.csv";

const SCENARIOS_FILE: &str = "scenarios.csv";

/// Raw CSV row matching scenarios.csv columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "ScenarioID")]
    scenario_id: u32,
    #[serde(rename = "AccountType")]
    account_type: String,
    #[serde(rename = "StartingBalance")]
    starting_balance: f64,
    #[serde(rename = "StartYear")]
    start_year: i32,
    #[serde(rename = "Years")]
    years: u32,
    #[serde(rename = "GrowthRate")]
    growth_rate: f64,
    #[serde(rename = "InflationRate")]
    inflation_rate: f64,
    #[serde(rename = "StartingAge")]
    starting_age: Option<u32>,
    #[serde(rename = "FilingStatus")]
    filing_status: Option<String>,
    #[serde(rename = "Income")]
    income: Option<f64>,
    #[serde(rename = "IncomeGrowth")]
    income_growth: Option<f64>,
    #[serde(rename = "PlanCovered")]
    plan_covered: Option<bool>,
    #[serde(rename = "PauseStartYear")]
    pause_start_year: Option<i32>,
    #[serde(rename = "PauseYears")]
    pause_years: Option<u32>,
    #[serde(rename = "LimitGrowth")]
    limit_growth: Option<f64>,
}

impl CsvRow {
    fn to_parameters(self) -> Result<ProjectionParameters, LoadError> {
        let parse_error = |message: String| LoadError::Parse {
            file: SCENARIOS_FILE.to_string(),
            message,
        };

        let account_type = AccountType::parse(&self.account_type)
            .ok_or_else(|| parse_error(format!("Unknown AccountType: {}", self.account_type)))?;

        let mut params = ProjectionParameters::new(
            account_type,
            self.starting_balance,
            self.start_year,
            self.years,
            self.growth_rate,
            self.inflation_rate,
        )
        .with_scenario_id(self.scenario_id);

        if let Some(age) = self.starting_age {
            params = params.with_starting_age(age);
        }

        match (self.filing_status.as_deref(), self.income) {
            (Some(status), Some(income)) => {
                let filing_status = FilingStatus::parse(status)
                    .ok_or_else(|| parse_error(format!("Unknown FilingStatus: {}", status)))?;
                let profile = IncomeProfile::new(filing_status, income)
                    .with_growth(self.income_growth.unwrap_or(0.0))
                    .covered_by_plan(self.plan_covered.unwrap_or(false));
                params = params.with_income(profile);
            }
            (None, None) => {}
            _ => {
                return Err(parse_error(format!(
                    "Scenario {}: FilingStatus and Income must be given together",
                    self.scenario_id
                )))
            }
        }

        if let Some(start_year) = self.pause_start_year {
            params = params.with_pause(ContributionPause {
                start_year,
                years: self.pause_years.unwrap_or(1),
            });
        }

        if let Some(rate) = self.limit_growth {
            params = params.with_limit_growth_rate(rate);
        }

        Ok(params)
    }
}

/// Load all scenarios from a CSV file
pub fn load_scenarios<P: AsRef<Path>>(path: P) -> Result<Vec<ProjectionParameters>, LoadError> {
    let path = path.as_ref();
    let scenarios = read_scenarios(Reader::from_path(path)?)?;
    log::info!("Loaded {} scenarios from {}", scenarios.len(), path.display());
    Ok(scenarios)
}

/// Load scenarios from any reader (e.g., string buffer, network stream)
pub fn load_scenarios_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<ProjectionParameters>, LoadError> {
    read_scenarios(Reader::from_reader(reader))
}

/// Load scenarios from the default data/scenarios.csv location
pub fn load_default_scenarios() -> Result<Vec<ProjectionParameters>, LoadError> {
    load_scenarios(DEFAULT_SCENARIOS_PATH)
}

fn read_scenarios<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<ProjectionParameters>, LoadError> {
    let mut scenarios = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        scenarios.push(row.to_parameters()?);
    }

    Ok(scenarios)
}
