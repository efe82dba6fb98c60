//! Historical contribution limit tables and their extrapolation policies

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};

/// How a table answers for years after its last known entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ExtrapolationPolicy {
    /// Last known value for every later year
    HoldConstant,
    /// `last * (1 + rate)^(years past last entry)`, optionally rounded to a multiple of `round_to`
    Compound { rate: f64, round_to: Option<f64> },
    /// `last + floor(years past last entry / every_years) * increment`
    Step { every_years: u32, increment: f64 },
    /// Years past the table are an error
    Reject,
}

impl ExtrapolationPolicy {
    /// Extrapolate forward from the last known entry. `None` means the policy rejects the year.
    pub fn extrapolate(&self, last_year: i32, last_value: f64, year: i32) -> Option<f64> {
        let elapsed = year - last_year;
        match *self {
            ExtrapolationPolicy::HoldConstant => Some(last_value),
            ExtrapolationPolicy::Compound { rate, round_to } => {
                let projected = last_value * (1.0 + rate).powi(elapsed);
                Some(match round_to {
                    Some(step) => round_to_nearest(projected, step),
                    None => projected,
                })
            }
            ExtrapolationPolicy::Step { every_years, increment } => {
                let steps = if every_years == 0 { 0 } else { elapsed / every_years as i32 };
                Some(last_value + steps as f64 * increment)
            }
            ExtrapolationPolicy::Reject => None,
        }
    }

    /// Replace the rate of a compounding policy; other policies are returned unchanged
    pub fn with_rate(self, new_rate: f64) -> Self {
        match self {
            ExtrapolationPolicy::Compound { round_to, .. } => ExtrapolationPolicy::Compound {
                rate: new_rate,
                round_to,
            },
            other => other,
        }
    }
}

/// Round half away from zero to the nearest multiple of `step`
pub fn round_to_nearest(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    (value / step).round() * step
}

/// Where a year falls relative to a year-keyed history
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum YearLookup<T> {
    /// Exact entry, or the nearest earlier entry inside the table's range
    Known(T),
    BeforeHistory,
    AfterHistory { last_year: i32, last: T },
}

pub(crate) fn lookup_year<T: Copy>(entries: &BTreeMap<i32, T>, year: i32) -> YearLookup<T> {
    let Some((&last_year, &last)) = entries.iter().next_back() else {
        return YearLookup::BeforeHistory;
    };
    if year > last_year {
        return YearLookup::AfterHistory { last_year, last };
    }
    match entries.range(..=year).next_back() {
        Some((_, &value)) => YearLookup::Known(value),
        None => YearLookup::BeforeHistory,
    }
}

/// Immutable mapping from calendar year to annual contribution limit
#[derive(Debug, Clone, PartialEq)]
pub struct ContributionLimitTable {
    name: String,
    limits: BTreeMap<i32, f64>,
    policy: ExtrapolationPolicy,
}

impl ContributionLimitTable {
    /// Build a table from (year, limit) pairs.
    /// Fails on an empty table, duplicate years, or negative/non-finite limits.
    pub fn new(
        name: impl Into<String>,
        entries: impl IntoIterator<Item = (i32, f64)>,
        policy: ExtrapolationPolicy,
    ) -> Result<Self> {
        let name = name.into();
        let mut limits = BTreeMap::new();

        for (year, limit) in entries {
            if !limit.is_finite() || limit < 0.0 {
                return Err(ProjectionError::invalid(format!(
                    "{} limit for {} must be a non-negative number, got {}",
                    name, year, limit
                )));
            }
            if limits.insert(year, limit).is_some() {
                return Err(ProjectionError::invalid(format!(
                    "{} table has more than one entry for {}",
                    name, year
                )));
            }
        }

        if limits.is_empty() {
            return Err(ProjectionError::invalid(format!("{} table is empty", name)));
        }

        Ok(Self { name, limits, policy })
    }

    /// Same data under a different extrapolation policy
    pub fn with_policy(mut self, policy: ExtrapolationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> ExtrapolationPolicy {
        self.policy
    }

    pub fn first_year(&self) -> i32 {
        self.limits.keys().next().copied().unwrap_or_default()
    }

    pub fn last_year(&self) -> i32 {
        self.limits.keys().next_back().copied().unwrap_or_default()
    }

    /// Exact historical entry, if any
    pub fn get(&self, year: i32) -> Option<f64> {
        self.limits.get(&year).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.limits.iter().map(|(&y, &l)| (y, l))
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }

    /// Limit for a year under the table's own policy
    pub fn limit_for(&self, year: i32) -> Result<f64> {
        self.limit_with_policy(year, &self.policy)
    }

    /// Limit for a year, extrapolating with `policy` instead of the table's own
    pub fn limit_with_policy(&self, year: i32, policy: &ExtrapolationPolicy) -> Result<f64> {
        match lookup_year(&self.limits, year) {
            YearLookup::Known(limit) => Ok(limit),
            YearLookup::BeforeHistory => Err(self.unsupported(year)),
            YearLookup::AfterHistory { last_year, last } => {
                let projected = policy
                    .extrapolate(last_year, last, year)
                    .ok_or_else(|| self.unsupported(year))?;
                log::trace!(
                    "{}: extrapolated {} from {} ({:.2}) to {:.2}",
                    self.name, year, last_year, last, projected
                );
                Ok(projected.max(0.0))
            }
        }
    }

    /// Compound annual growth rate between the first and last entries.
    /// Both endpoints are rounded to `round_to` first when given.
    pub fn historical_growth_rate(&self, round_to: Option<f64>) -> Option<f64> {
        let (&first_year, &first) = self.limits.iter().next()?;
        let (&last_year, &last) = self.limits.iter().next_back()?;
        let years = last_year - first_year;

        let (start, end) = match round_to {
            Some(step) => (round_to_nearest(first, step), round_to_nearest(last, step)),
            None => (first, last),
        };

        if years <= 0 || start <= 0.0 {
            return None;
        }

        Some((end / start).powf(1.0 / years as f64) - 1.0)
    }

    fn unsupported(&self, year: i32) -> ProjectionError {
        ProjectionError::UnsupportedYear {
            year,
            table: self.name.clone(),
        }
    }
}
