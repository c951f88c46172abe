use crate::models::Variable;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Why a row did not make it into a processed series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscardReason {
    /// Date/time blank, malformed or row too short to place in time
    RowParseFailure,
    /// Blank, sentinel, NaN/null or unparseable value
    MissingValue,
    /// Instant already claimed by an earlier row
    DuplicateInstant,
}

/// Per station+variable row accounting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardStats {
    pub rows_read: usize,
    pub retained: usize,
    pub row_parse_failures: usize,
    pub missing_values: usize,
    pub duplicates: usize,
}

impl DiscardStats {
    pub fn record(&mut self, reason: DiscardReason) {
        match reason {
            DiscardReason::RowParseFailure => self.row_parse_failures += 1,
            DiscardReason::MissingValue => self.missing_values += 1,
            DiscardReason::DuplicateInstant => self.duplicates += 1,
        }
    }

    pub fn discarded(&self) -> usize {
        self.row_parse_failures + self.missing_values + self.duplicates
    }

    pub fn merge(&mut self, other: &DiscardStats) {
        self.rows_read += other.rows_read;
        self.retained += other.retained;
        self.row_parse_failures += other.row_parse_failures;
        self.missing_values += other.missing_values;
        self.duplicates += other.duplicates;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Completed {
        series_len: usize,
        expected: i64,
        completeness: f64,
        degenerate_range: bool,
    },
    Skipped {
        reason: String,
    },
    Failed {
        error: String,
    },
}

/// Outcome of one station+variable run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRunSummary {
    pub source: String,
    pub station_code: Option<String>,
    pub variable: Option<Variable>,
    pub stats: DiscardStats,
    #[serde(flatten)]
    pub status: RunStatus,
}

/// Everything a year's run produced and discarded
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub year: i32,
    pub stations_seen: usize,
    pub totals: DiscardStats,
    pub completed_runs: usize,
    pub skipped_runs: usize,
    pub failed_runs: usize,
    pub degenerate_ranges: usize,
    pub failed_reports: Vec<String>,
    pub runs: Vec<StationRunSummary>,
}

impl RunSummary {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            ..Self::default()
        }
    }

    pub fn add_run(&mut self, run: StationRunSummary) {
        self.totals.merge(&run.stats);
        match &run.status {
            RunStatus::Completed {
                degenerate_range, ..
            } => {
                self.completed_runs += 1;
                if *degenerate_range {
                    self.degenerate_ranges += 1;
                }
            }
            RunStatus::Skipped { .. } => self.skipped_runs += 1,
            RunStatus::Failed { .. } => self.failed_runs += 1,
        }
        self.runs.push(run);
    }

    /// Data rows per station file, counted once however many variables read it.
    /// Every variable run of a file sees every row, so the largest count wins.
    pub fn station_rows_read(&self) -> usize {
        let mut per_source: HashMap<&str, usize> = HashMap::new();
        for run in &self.runs {
            let rows = per_source.entry(run.source.as_str()).or_default();
            *rows = (*rows).max(run.stats.rows_read);
        }
        per_source.values().sum()
    }

    /// Generate a human-readable summary
    pub fn generate_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str(&format!("=== INMET Processing Report {} ===\n", self.year));
        summary.push_str(&format!("Station files: {}\n", self.stations_seen));
        summary.push_str(&format!(
            "Runs: {} completed, {} skipped, {} failed\n",
            self.completed_runs, self.skipped_runs, self.failed_runs
        ));
        summary.push_str(&format!(
            "Station rows read: {}\n",
            self.station_rows_read()
        ));
        summary.push_str(&format!(
            "Variable rows read (summed over station+variable runs): {}\n",
            self.totals.rows_read
        ));
        summary.push_str(&format!(
            "Variable rows retained: {} ({:.1}%)\n",
            self.totals.retained,
            percentage(self.totals.retained, self.totals.rows_read)
        ));
        summary.push_str(&format!(
            "Discarded - row parse failures: {}\n",
            self.totals.row_parse_failures
        ));
        summary.push_str(&format!(
            "Discarded - missing values: {}\n",
            self.totals.missing_values
        ));
        summary.push_str(&format!(
            "Discarded - duplicate instants: {}\n",
            self.totals.duplicates
        ));
        summary.push_str(&format!(
            "Degenerate ranges: {}\n",
            self.degenerate_ranges
        ));

        for variable in Variable::ALL {
            let completed: Vec<f64> = self
                .runs
                .iter()
                .filter(|r| r.variable == Some(variable))
                .filter_map(|r| match r.status {
                    RunStatus::Completed { completeness, .. } => Some(completeness),
                    _ => None,
                })
                .collect();
            if completed.is_empty() {
                continue;
            }
            summary.push_str(&format!(
                "{} ({}): {} stations, mean completeness {:.2}\n",
                variable.display_name(),
                variable.units(),
                completed.len(),
                completed.iter().sum::<f64>() / completed.len() as f64
            ));
        }

        let problems: Vec<&StationRunSummary> = self
            .runs
            .iter()
            .filter(|r| !matches!(r.status, RunStatus::Completed { .. }))
            .collect();
        if !problems.is_empty() {
            summary.push_str("\nSkipped or failed (first 10):\n");
            for (i, run) in problems.iter().take(10).enumerate() {
                let detail = match &run.status {
                    RunStatus::Skipped { reason } => reason.as_str(),
                    RunStatus::Failed { error } => error.as_str(),
                    RunStatus::Completed { .. } => "",
                };
                summary.push_str(&format!("  {}. {}: {}\n", i + 1, run.source, detail));
            }
        }

        for report in &self.failed_reports {
            summary.push_str(&format!("Report not written: {}\n", report));
        }

        summary
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}
