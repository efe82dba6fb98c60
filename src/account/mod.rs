//! Projection inputs and scenario loading

mod data;
pub mod loader;

pub use data::{
    AccountType, ContributionPause, ContributionStrategy, FilingStatus, IncomeProfile,
    ProjectionParameters, CATCH_UP_AGE, MAX_STARTING_AGE,
};
pub use loader::{load_default_scenarios, load_scenarios, load_scenarios_from_reader};
