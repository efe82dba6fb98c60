//! Run every scenario in data/scenarios.csv
//!
//! Outputs one row per scenario-year for downstream comparison

use anyhow::Context;
use retirement_projection::account::load_default_scenarios;
use retirement_projection::ScenarioRunner;
use serde::Serialize;
use std::time::Instant;

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct BatchRow {
    #[serde(rename = "ScenarioID")]
    scenario_id: u32,
    account_type: &'static str,
    year: i32,
    age: Option<u32>,
    income: Option<f64>,
    limit: f64,
    contribution: f64,
    growth: f64,
    nominal_balance: f64,
    real_balance: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let start = Instant::now();
    println!("Loading scenarios from data/scenarios.csv...");

    let scenarios = load_default_scenarios().context("Failed to load scenarios")?;
    println!("Loaded {} scenarios in {:?}", scenarios.len(), start.elapsed());

    let runner = ScenarioRunner::from_csv().context("Failed to load assumptions")?;

    println!("Running projections...");
    let proj_start = Instant::now();
    let results = runner.run_batch(&scenarios);
    println!("Projections complete in {:?}", proj_start.elapsed());

    let output_path = "batch_projection_output.csv";
    let mut writer = csv::Writer::from_path(output_path).with_context(|| format!("Failed to create {}", output_path))?;

    let mut failures = 0;
    for (params, result) in scenarios.iter().zip(&results) {
        let result = match result {
            Ok(result) => result,
            Err(e) => {
                log::error!("Scenario {} failed: {}", params.scenario_id, e);
                failures += 1;
                continue;
            }
        };

        for row in &result.records {
            writer.serialize(BatchRow {
                scenario_id: result.scenario_id,
                account_type: result.account_type.as_str(),
                year: row.year,
                age: row.age,
                income: row.income.map(cents),
                limit: cents(row.contribution_limit),
                contribution: cents(row.contribution_applied),
                growth: cents(row.growth_amount),
                nominal_balance: cents(row.nominal_balance),
                real_balance: cents(row.real_balance),
            })?;
        }
    }
    writer.flush()?;

    println!("Output written to {}", output_path);

    println!("\nBatch Summary:");
    for result in results.iter().flatten() {
        let summary = result.summary();
        println!(
            "  Scenario {:>3} {:<15} years={:>3} contributions=${:.0} final=${:.0} real=${:.0}",
            summary.scenario_id,
            summary.account_type.as_str(),
            summary.total_years,
            summary.total_contributions,
            summary.final_nominal,
            summary.final_real,
        );
    }
    if failures > 0 {
        println!("  {} scenarios failed (see log)", failures);
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}

fn cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
