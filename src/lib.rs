//! Retirement Projection - year-by-year balance projections for tax-advantaged accounts
//!
//! This library provides:
//! - 401(k), Traditional IRA and Roth IRA contribution limits from published history
//! - Explicit extrapolation policies for years past the published tables
//! - Catch-up contributions and income-based phase-outs
//! - Growth-then-contribute balance projections with inflation-deflated real values
//! - Batch and household-level scenario runs

pub mod error;
pub mod account;
pub mod assumptions;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use error::{LoadError, ProjectionError, Result};
pub use account::{AccountType, FilingStatus, IncomeProfile, ProjectionParameters};
pub use assumptions::{Assumptions, ContributionLimitTable, ExtrapolationPolicy, PhaseOutRule};
pub use projection::{ProjectionEngine, ProjectionResult, YearRecord};
pub use scenario::ScenarioRunner;
