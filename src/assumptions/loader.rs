//! CSV-based assumption loader
//!
//! Loads contribution limit history and phase-out ranges from CSV files in data/assumptions/

use std::fs::File;
use std::path::Path;

use super::phase_out::{IncomeRange, PhaseOutEntry, PhaseOutKind};
use crate::account::FilingStatus;
use crate::error::LoadError;

/// Default path to assumptions directory
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions";

pub const LIMITS_401K_FILE: &str = "limits_401k.csv";
pub const CATCH_UP_401K_FILE: &str = "catch_up_401k.csv";
pub const LIMITS_IRA_FILE: &str = "limits_ira.csv";
pub const CATCH_UP_IRA_FILE: &str = "catch_up_ira.csv";
pub const PHASE_OUT_FILE: &str = "phase_out_ranges.csv";

fn parse_error(file: &str, message: String) -> LoadError {
    LoadError::Parse {
        file: file.to_string(),
        message,
    }
}

/// Load a Year,Limit history.
/// Returns (year, limit) pairs in file order
pub fn load_limit_history(path: &Path, file_name: &str) -> Result<Vec<(i32, f64)>, LoadError> {
    let file = File::open(path.join(file_name))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut limits = Vec::new();

    for result in reader.records() {
        let record = result?;
        let year: i32 = record[0]
            .trim()
            .parse()
            .map_err(|e| parse_error(file_name, format!("bad year '{}': {}", &record[0], e)))?;
        let limit: f64 = record[1]
            .trim()
            .parse()
            .map_err(|e| parse_error(file_name, format!("bad limit '{}': {}", &record[1], e)))?;
        limits.push((year, limit));
    }

    Ok(limits)
}

/// Load phase-out ranges (Year,Kind,FilingStatus,Lower,Upper)
pub fn load_phase_out_ranges(path: &Path) -> Result<Vec<PhaseOutEntry>, LoadError> {
    let file = File::open(path.join(PHASE_OUT_FILE))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut entries = Vec::new();

    for result in reader.records() {
        let record = result?;
        let year: i32 = record[0]
            .trim()
            .parse()
            .map_err(|e| parse_error(PHASE_OUT_FILE, format!("bad year '{}': {}", &record[0], e)))?;
        let kind = PhaseOutKind::parse(record[1].trim())
            .ok_or_else(|| parse_error(PHASE_OUT_FILE, format!("Unknown Kind: {}", &record[1])))?;
        let filing_status = FilingStatus::parse(record[2].trim())
            .ok_or_else(|| parse_error(PHASE_OUT_FILE, format!("Unknown FilingStatus: {}", &record[2])))?;
        let lower: f64 = record[3]
            .trim()
            .parse()
            .map_err(|e| parse_error(PHASE_OUT_FILE, format!("bad lower bound '{}': {}", &record[3], e)))?;
        let upper: f64 = record[4]
            .trim()
            .parse()
            .map_err(|e| parse_error(PHASE_OUT_FILE, format!("bad upper bound '{}': {}", &record[4], e)))?;

        entries.push(PhaseOutEntry {
            year,
            kind,
            filing_status,
            range: IncomeRange::new(lower, upper)?,
        });
    }

    Ok(entries)
}

/// Raw tables read from the assumptions directory
pub struct LoadedAssumptions {
    pub limits_401k: Vec<(i32, f64)>,
    pub catch_up_401k: Vec<(i32, f64)>,
    pub limits_ira: Vec<(i32, f64)>,
    pub catch_up_ira: Vec<(i32, f64)>,
    pub phase_outs: Vec<PhaseOutEntry>,
}

impl LoadedAssumptions {
    /// Load all assumptions from the default path
    pub fn load_default() -> Result<Self, LoadError> {
        Self::load_from(Path::new(DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load all assumptions from a specific path
    pub fn load_from(path: &Path) -> Result<Self, LoadError> {
        let loaded = Self {
            limits_401k: load_limit_history(path, LIMITS_401K_FILE)?,
            catch_up_401k: load_limit_history(path, CATCH_UP_401K_FILE)?,
            limits_ira: load_limit_history(path, LIMITS_IRA_FILE)?,
            catch_up_ira: load_limit_history(path, CATCH_UP_IRA_FILE)?,
            phase_outs: load_phase_out_ranges(path)?,
        };
        log::info!(
            "Loaded assumptions from {}: {} 401(k) years, {} IRA years, {} phase-out ranges",
            path.display(),
            loaded.limits_401k.len(),
            loaded.limits_ira.len(),
            loaded.phase_outs.len()
        );
        Ok(loaded)
    }
}
