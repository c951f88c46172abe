use crate::error::{ProcessingError, Result};
use crate::models::{ProcessedSeries, StationIdentity, Variable};
use crate::parsers::{build_instant, parse_value, Extracted, ParsedValue, RowExtractor};
use crate::processors::completeness::{CompletenessBreakdown, CompletenessCalculator};
use crate::processors::deduplicator::{Admission, StreamingDeduplicator};
use crate::processors::discard_stats::{DiscardReason, DiscardStats};
use crate::readers::StationReader;
use csv::StringRecord;
use std::io::Read;
use tracing::{debug, info, info_span, warn};

/// A finished station+variable run
#[derive(Debug)]
pub struct VariableSeries {
    pub variable: Variable,
    pub series: ProcessedSeries,
    pub stats: DiscardStats,
    pub completeness: CompletenessBreakdown,
}

#[derive(Debug)]
pub enum VariableOutcome {
    Completed(VariableSeries),
    /// The variable's column is absent from this station file
    Skipped {
        variable: Variable,
        error: ProcessingError,
    },
}

impl VariableOutcome {
    pub fn variable(&self) -> Variable {
        match self {
            VariableOutcome::Completed(run) => run.variable,
            VariableOutcome::Skipped { variable, .. } => *variable,
        }
    }
}

/// State owned by one station+variable run for the life of the stream
struct VariableRun {
    variable: Variable,
    extractor: RowExtractor,
    deduplicator: StreamingDeduplicator,
    stats: DiscardStats,
}

impl VariableRun {
    fn new(variable: Variable, extractor: RowExtractor) -> Self {
        Self {
            variable,
            extractor,
            deduplicator: StreamingDeduplicator::new(),
            stats: DiscardStats::default(),
        }
    }

    fn ingest(&mut self, row: &StringRecord) {
        self.stats.rows_read += 1;
        let line = row.position().map_or(0, |p| p.line());

        let (date, time, raw_value) = match self.extractor.extract(row) {
            Extracted::Complete(fields) => (fields.date, fields.time, Some(fields.value)),
            Extracted::MissingValue { date, time } => (date, time, None),
            Extracted::Unplaced => {
                debug!(line, variable = %self.variable, "Discarding row without date or time");
                self.stats.record(DiscardReason::RowParseFailure);
                return;
            }
        };

        let instant = match build_instant(date, time) {
            Ok(instant) => instant,
            Err(e) => {
                debug!(line, variable = %self.variable, "Discarding row: {}", e);
                self.stats.record(DiscardReason::RowParseFailure);
                return;
            }
        };

        let value = match raw_value.map(parse_value) {
            Some(ParsedValue::Value(v)) => Some(v),
            Some(ParsedValue::Unparseable) => {
                debug!(
                    line,
                    variable = %self.variable,
                    "Treating unparseable value {:?} as missing",
                    raw_value.unwrap_or_default()
                );
                None
            }
            Some(ParsedValue::Missing) | None => None,
        };

        match self.deduplicator.offer(instant, value) {
            Admission::Retained => self.stats.retained += 1,
            Admission::ClaimedWithoutValue => self.stats.record(DiscardReason::MissingValue),
            Admission::Duplicate => self.stats.record(DiscardReason::DuplicateInstant),
        }
    }

    fn finish(self, calculator: &CompletenessCalculator) -> VariableSeries {
        let series = self.deduplicator.finish();
        let completeness = calculator.breakdown(&series);

        VariableSeries {
            variable: self.variable,
            series,
            stats: self.stats,
            completeness,
        }
    }
}

/// Streams one station file once, feeding an independent run per variable
#[derive(Debug, Clone)]
pub struct StationPipeline {
    reader: StationReader,
    variables: Vec<Variable>,
}

impl StationPipeline {
    pub fn new(variables: Vec<Variable>) -> Self {
        Self {
            reader: StationReader::new(),
            variables,
        }
    }

    pub fn with_reader(mut self, reader: StationReader) -> Self {
        self.reader = reader;
        self
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Run every configured variable over one station stream.
    ///
    /// A missing column skips only that variable; an unreadable stream fails
    /// the whole station.
    pub fn run<R: Read>(&self, station: &StationIdentity, source: R) -> Result<Vec<VariableOutcome>> {
        let _span = info_span!("station", code = %station.code).entered();

        let mut stream = self.reader.open(source)?;

        let mut outcomes = Vec::new();
        let mut runs = Vec::new();
        for &variable in &self.variables {
            match stream.headers().select(variable, &station.code) {
                Ok(columns) => runs.push(VariableRun::new(variable, RowExtractor::new(columns))),
                Err(error) => {
                    warn!("Skipping {} for station {}: {}", variable, station.code, error);
                    outcomes.push(VariableOutcome::Skipped { variable, error });
                }
            }
        }

        if runs.is_empty() {
            return Ok(outcomes);
        }

        while let Some(chunk) = stream.next_chunk()? {
            for row in &chunk {
                for run in runs.iter_mut() {
                    run.ingest(row);
                }
            }
        }

        let calculator = CompletenessCalculator::new();
        for run in runs {
            let finished = run.finish(&calculator);
            info!(
                "Station {} {}: {} rows, {} retained, {} parse failures, {} missing, {} duplicates, completeness {:.2}",
                station.code,
                finished.variable,
                finished.stats.rows_read,
                finished.stats.retained,
                finished.stats.row_parse_failures,
                finished.stats.missing_values,
                finished.stats.duplicates,
                finished.completeness.completeness
            );
            outcomes.push(VariableOutcome::Completed(finished));
        }

        outcomes.sort_by_key(VariableOutcome::variable);
        Ok(outcomes)
    }
}
