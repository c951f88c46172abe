use crate::error::{ProcessingError, Result};
use crate::models::Variable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Completeness of one station's series for one variable and year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletenessResult {
    pub station_code: String,
    pub variable: Variable,
    /// Ratio in [0.00, 1.00], rounded to two decimals
    pub completeness: f64,
}

impl CompletenessResult {
    pub fn new(station_code: impl Into<String>, variable: Variable, completeness: f64) -> Self {
        Self {
            station_code: station_code.into(),
            variable,
            completeness: round_to_hundredths(completeness.clamp(0.0, 1.0)),
        }
    }

    pub fn formatted(&self) -> String {
        format!("{:.2}", self.completeness)
    }
}

/// Round to two decimals on the exact decimal value, ties to even
/// (`0.125` -> `0.12`, `0.625` -> `0.62`)
pub(crate) fn round_to_hundredths(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Completeness results for one variable and year, keyed and ordered by station code
#[derive(Debug, Clone, PartialEq)]
pub struct CompletenessReport {
    pub variable: Variable,
    pub year: i32,
    entries: BTreeMap<String, f64>,
}

impl CompletenessReport {
    pub fn new(variable: Variable, year: i32) -> Self {
        Self {
            variable,
            year,
            entries: BTreeMap::new(),
        }
    }

    /// Add a station result; a station code may appear only once per report
    pub fn insert(&mut self, result: CompletenessResult) -> Result<()> {
        if result.variable != self.variable {
            return Err(ProcessingError::InvalidFormat(format!(
                "result for '{}' offered to '{}' report",
                result.variable, self.variable
            )));
        }

        if self.entries.contains_key(&result.station_code) {
            return Err(ProcessingError::AggregationConflict {
                station_code: result.station_code,
                variable: self.variable.to_string(),
            });
        }

        self.entries
            .insert(result.station_code, result.completeness);
        Ok(())
    }

    pub fn get(&self, station_code: &str) -> Option<f64> {
        self.entries.get(station_code).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Results in ascending station-code order
    pub fn results(&self) -> impl Iterator<Item = CompletenessResult> + '_ {
        self.entries
            .iter()
            .map(|(code, completeness)| CompletenessResult {
                station_code: code.clone(),
                variable: self.variable,
                completeness: *completeness,
            })
    }

    pub fn mean_completeness(&self) -> Option<f64> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.values().sum::<f64>() / self.entries.len() as f64)
        }
    }
}
