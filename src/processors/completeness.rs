use crate::models::completeness::round_to_hundredths;
use crate::models::{CompletenessResult, ProcessedSeries, Variable};
use crate::utils::constants::SECONDS_PER_OBSERVATION;
use tracing::warn;

/// Intermediate figures behind a completeness ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletenessBreakdown {
    pub expected: i64,
    pub valid: usize,
    pub completeness: f64,
    pub degenerate_range: bool,
}

/// Ratio of valid observations to the hourly slots in the series' own
/// `[first, last]` window. Gaps never shrink the denominator.
pub struct CompletenessCalculator {
    step_seconds: i64,
}

impl CompletenessCalculator {
    pub fn new() -> Self {
        Self {
            step_seconds: SECONDS_PER_OBSERVATION,
        }
    }

    pub fn breakdown(&self, series: &ProcessedSeries) -> CompletenessBreakdown {
        let (Some(start), Some(end)) = (series.first_instant(), series.last_instant()) else {
            return CompletenessBreakdown {
                expected: 0,
                valid: 0,
                completeness: 0.0,
                degenerate_range: false,
            };
        };

        let expected = (end - start).num_seconds().div_euclid(self.step_seconds) + 1;
        let valid = series.len();

        if expected <= 0 {
            warn!(
                "Anomalous observation range {} .. {} gives {} expected slots",
                start, end, expected
            );
            return CompletenessBreakdown {
                expected,
                valid,
                completeness: 0.0,
                degenerate_range: true,
            };
        }

        CompletenessBreakdown {
            expected,
            valid,
            completeness: round_to_hundredths((valid as f64 / expected as f64).min(1.0)),
            degenerate_range: false,
        }
    }

    pub fn calculate(
        &self,
        station_code: &str,
        variable: Variable,
        series: &ProcessedSeries,
    ) -> CompletenessResult {
        CompletenessResult::new(station_code, variable, self.breakdown(series).completeness)
    }
}

impl Default for CompletenessCalculator {
    fn default() -> Self {
        Self::new()
    }
}
