//! Retirement Projection demo
//!
//! Projects a 401(k) and a Roth IRA from the current calendar year and writes
//! the year-by-year records for an external presentation layer.

use anyhow::Context;
use chrono::Datelike;
use retirement_projection::{
    account::{ContributionPause, IncomeProfile},
    AccountType, FilingStatus, ProjectionParameters, ScenarioRunner,
};
use std::fs::File;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let start_year = chrono::Local::now().year();

    println!("Retirement Projection v0.1.0");
    println!("============================\n");

    let runner = ScenarioRunner::new();

    let plan_401k = ProjectionParameters::new(AccountType::Plan401k, 25_000.0, start_year, 30, 0.07, 0.03)
        .with_scenario_id(1)
        .with_starting_age(30);

    // Roth IRA for a single filer whose income grows into the phase-out,
    // with two years of full-time study and no contributions
    let roth = ProjectionParameters::new(AccountType::RothIra, 0.0, start_year, 30, 0.07, 0.03)
        .with_scenario_id(2)
        .with_starting_age(30)
        .with_income(IncomeProfile::new(FilingStatus::Single, 95_000.0).with_growth(0.03))
        .with_pause(ContributionPause {
            start_year: start_year + 2,
            years: 2,
        });

    let roth_result = runner.run(&roth).context("Roth IRA projection failed")?;

    let csv_path = "projection_output.csv";
    let mut writer = csv::Writer::from_path(csv_path).with_context(|| format!("Unable to create {}", csv_path))?;
    for record in &roth_result.records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    println!("Roth IRA records written to: {}", csv_path);

    let plan_result = runner.run(&plan_401k).context("401(k) projection failed")?;
    let household = runner
        .run_combined(&[plan_401k, roth])
        .context("household projection failed")?;

    let summaries = vec![plan_result.summary(), roth_result.summary()];
    let json_path = "projection_summary.json";
    let file = File::create(json_path).with_context(|| format!("Unable to create {}", json_path))?;
    serde_json::to_writer_pretty(
        file,
        &serde_json::json!({
            "accounts": summaries,
            "household": household.last(),
        }),
    )?;
    println!("Summary written to: {}", json_path);

    for summary in &summaries {
        println!(
            "\n{} ({}-{}):",
            summary.account_type.as_str(),
            summary.first_year.unwrap_or(start_year),
            summary.last_year.unwrap_or(start_year)
        );
        println!("  Total Contributions: ${:.2}", summary.total_contributions);
        println!("  Total Growth:        ${:.2}", summary.total_growth);
        println!("  Final Nominal:       ${:.2}", summary.final_nominal);
        println!("  Final Real:          ${:.2}", summary.final_real);
    }

    if let Some(last) = household.last() {
        println!("\nHousehold {}: nominal ${:.2}, real ${:.2}", last.year, last.nominal_balance, last.real_balance);
    }

    Ok(())
}
