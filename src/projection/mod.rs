//! Projection engine for single-account annual projections

mod state;
mod engine;
mod records;

pub use state::ProjectionState;
pub use engine::ProjectionEngine;
pub use records::{ProjectionResult, ProjectionSummary, YearRecord};
