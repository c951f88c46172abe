use crate::archive::YearArchive;
use crate::config::ProcessingConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{CompletenessReport, CompletenessResult, StationIdentity, Variable};
use crate::processors::discard_stats::{DiscardStats, RunStatus, RunSummary, StationRunSummary};
use crate::processors::report_aggregator::ReportAggregator;
use crate::processors::station_pipeline::{StationPipeline, VariableOutcome};
use crate::processors::CompletenessCalculator;
use crate::readers::{SeriesReader, StationReader};
use crate::utils::filename::{report_path, series_dir, series_path, summary_path};
use crate::utils::progress::ProgressReporter;
use crate::writers::{ReportWriter, SeriesWriter, SummaryWriter};
use crossbeam::channel::Sender;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// What a year's run wrote and how every station fared
#[derive(Debug)]
pub struct YearOutcome {
    pub summary: RunSummary,
    pub reports: BTreeMap<Variable, Result<CompletenessReport>>,
    pub written_reports: Vec<PathBuf>,
}

/// Runs station pipelines on a bounded rayon pool and aggregates the results
#[derive(Debug, Clone)]
pub struct ParallelProcessor {
    max_workers: usize,
    chunk_size: usize,
    preamble_lines: usize,
    variables: Vec<Variable>,
    show_progress: bool,
}

impl ParallelProcessor {
    pub fn new(max_workers: usize) -> Self {
        let defaults = ProcessingConfig::default();
        Self {
            max_workers: max_workers.max(1),
            chunk_size: defaults.chunk_size,
            preamble_lines: defaults.preamble_lines,
            variables: defaults.variables,
            show_progress: false,
        }
    }

    pub fn from_config(config: &ProcessingConfig) -> Self {
        Self::new(config.max_workers)
            .with_chunk_size(config.chunk_size)
            .with_preamble_lines(config.preamble_lines)
            .with_variables(config.variables.clone())
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_preamble_lines(mut self, preamble_lines: usize) -> Self {
        self.preamble_lines = preamble_lines;
        self
    }

    pub fn with_variables(mut self, variables: Vec<Variable>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn pipeline(&self) -> StationPipeline {
        StationPipeline::new(self.variables.clone()).with_reader(
            StationReader::new()
                .with_chunk_size(self.chunk_size)
                .with_preamble_lines(self.preamble_lines),
        )
    }

    fn thread_pool(&self) -> Result<rayon::ThreadPool> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))
    }

    /// Process one year's zip archive or directory off the async runtime
    pub async fn process_year(&self, input: &Path, year: i32, out_root: &Path) -> Result<YearOutcome> {
        let processor = self.clone();
        let input = input.to_path_buf();
        let out_root = out_root.to_path_buf();

        tokio::task::spawn_blocking(move || {
            let archive = YearArchive::open(&input)?;
            let files = archive.station_files()?;
            info!(
                "Found {} station files for {} in {}",
                files.len(),
                year,
                archive.source().display()
            );
            processor.process_stations(&files, year, &out_root)
        })
        .await?
    }

    /// Process station files in parallel, write series, reports and summary
    pub fn process_stations(&self, files: &[PathBuf], year: i32, out_root: &Path) -> Result<YearOutcome> {
        let pipeline = self.pipeline();
        let aggregator = ReportAggregator::new(year);
        let progress = if self.show_progress {
            ProgressReporter::new(files.len() as u64, &format!("Processing {} stations", year), false)
        } else {
            ProgressReporter::silent()
        };

        let (claimed, duplicates) = claim_station_codes(files);

        let runs: Vec<Vec<StationRunSummary>> = self.thread_pool()?.install(|| {
            claimed
                .par_iter()
                .map_with(aggregator.sender(), |sender, path| {
                    let runs = process_station_file(&pipeline, path, year, out_root, sender);
                    progress.increment(1);
                    runs
                })
                .collect()
        });

        progress.increment(duplicates.len() as u64);

        let mut summary = RunSummary::new(year);
        summary.stations_seen = files.len();
        for run in runs.into_iter().flatten().chain(duplicates) {
            summary.add_run(run);
        }

        let reports = aggregator.finish();
        let written_reports = write_reports(&reports, year, out_root, &mut summary)?;

        SummaryWriter::write_summary(&summary, &summary_path(out_root, year))?;
        progress.finish_with_message(&format!(
            "Processed {} station files for {}",
            files.len(),
            year
        ));

        Ok(YearOutcome {
            summary,
            reports,
            written_reports,
        })
    }

    /// Rebuild completeness reports from series files already on disk
    pub fn rebuild_reports(&self, year: i32, out_root: &Path) -> Result<YearOutcome> {
        let aggregator = ReportAggregator::new(year);
        let calculator = CompletenessCalculator::new();
        let mut summary = RunSummary::new(year);

        for &variable in &self.variables {
            let dir = series_dir(out_root, variable, year);
            if !dir.is_dir() {
                warn!(
                    "No processed series for {}/{} at {}; skipping report",
                    variable,
                    year,
                    dir.display()
                );
                continue;
            }

            let mut files = Vec::new();
            for entry in std::fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.extension().and_then(|e| e.to_str()) == Some("csv") {
                    files.push(path);
                }
            }
            summary.stations_seen += files.len();

            let runs: Vec<StationRunSummary> = self.thread_pool()?.install(|| {
                files
                    .par_iter()
                    .map_with(aggregator.sender(), |sender, path| {
                        rebuild_one(&calculator, variable, path, sender)
                    })
                    .collect()
            });
            for run in runs {
                summary.add_run(run);
            }
        }

        let reports = aggregator.finish();
        let written_reports = write_reports(&reports, year, out_root, &mut summary)?;

        Ok(YearOutcome {
            summary,
            reports,
            written_reports,
        })
    }
}

impl Default for ParallelProcessor {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

/// Keep the first file (in the given order) for each station code. Later
/// files with the same code would write the same series paths, so they are
/// returned as skipped runs instead.
fn claim_station_codes(files: &[PathBuf]) -> (Vec<&PathBuf>, Vec<StationRunSummary>) {
    let mut owners: HashMap<String, &PathBuf> = HashMap::new();
    let mut claimed = Vec::with_capacity(files.len());
    let mut duplicates = Vec::new();

    for path in files {
        // unnamed files are reported by the pool task itself
        let Ok(station) = StationIdentity::from_path(path) else {
            claimed.push(path);
            continue;
        };

        match owners.get(&station.code) {
            Some(owner) => {
                let reason = format!(
                    "station code {} already provided by {}",
                    station.code,
                    owner.display()
                );
                warn!("Skipping {}: {}", path.display(), reason);
                duplicates.push(StationRunSummary {
                    source: source_name(path),
                    station_code: Some(station.code),
                    variable: None,
                    stats: DiscardStats::default(),
                    status: RunStatus::Skipped { reason },
                });
            }
            None => {
                owners.insert(station.code, path);
                claimed.push(path);
            }
        }
    }

    (claimed, duplicates)
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// One pool task: a station file, one run per configured variable
fn process_station_file(
    pipeline: &StationPipeline,
    path: &Path,
    year: i32,
    out_root: &Path,
    sender: &Sender<CompletenessResult>,
) -> Vec<StationRunSummary> {
    let source = source_name(path);

    let station = match StationIdentity::from_path(path) {
        Ok(station) => station,
        Err(e) => {
            warn!("Skipping {}: {}", source, e);
            return vec![StationRunSummary {
                source,
                station_code: None,
                variable: None,
                stats: DiscardStats::default(),
                status: RunStatus::Skipped {
                    reason: e.to_string(),
                },
            }];
        }
    };

    let outcomes = File::open(path)
        .map_err(ProcessingError::from)
        .and_then(|file| pipeline.run(&station, file));

    let outcomes = match outcomes {
        Ok(outcomes) => outcomes,
        Err(e) => {
            error!("Station {} ({}) failed: {}", station.code, source, e);
            return pipeline
                .variables()
                .iter()
                .map(|&variable| StationRunSummary {
                    source: source.clone(),
                    station_code: Some(station.code.clone()),
                    variable: Some(variable),
                    stats: DiscardStats::default(),
                    status: RunStatus::Failed {
                        error: e.to_string(),
                    },
                })
                .collect();
        }
    };

    outcomes
        .into_iter()
        .map(|outcome| match outcome {
            VariableOutcome::Skipped { variable, error } => StationRunSummary {
                source: source.clone(),
                station_code: Some(station.code.clone()),
                variable: Some(variable),
                stats: DiscardStats::default(),
                status: RunStatus::Skipped {
                    reason: error.to_string(),
                },
            },
            VariableOutcome::Completed(run) => {
                let output = series_path(out_root, run.variable, year, &station.code);
                let status = match SeriesWriter::write_series(&run.series, &output) {
                    Ok(()) => {
                        let result = CompletenessResult::new(
                            station.code.clone(),
                            run.variable,
                            run.completeness.completeness,
                        );
                        if sender.send(result).is_err() {
                            warn!("Report collection closed before station {}", station.code);
                        }
                        RunStatus::Completed {
                            series_len: run.series.len(),
                            expected: run.completeness.expected,
                            completeness: run.completeness.completeness,
                            degenerate_range: run.completeness.degenerate_range,
                        }
                    }
                    Err(e) => {
                        error!("Cannot write {}: {}", output.display(), e);
                        RunStatus::Failed {
                            error: e.to_string(),
                        }
                    }
                };

                StationRunSummary {
                    source: source.clone(),
                    station_code: Some(station.code.clone()),
                    variable: Some(run.variable),
                    stats: run.stats,
                    status,
                }
            }
        })
        .collect()
}

fn rebuild_one(
    calculator: &CompletenessCalculator,
    variable: Variable,
    path: &Path,
    sender: &Sender<CompletenessResult>,
) -> StationRunSummary {
    let source = path.display().to_string();
    let station_code = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string);

    let status = match (&station_code, SeriesReader::read_series(path)) {
        (Some(code), Ok(series)) => {
            let breakdown = calculator.breakdown(&series);
            let result = CompletenessResult::new(code.clone(), variable, breakdown.completeness);
            if sender.send(result).is_err() {
                warn!("Report collection closed before series {}", source);
            }
            RunStatus::Completed {
                series_len: series.len(),
                expected: breakdown.expected,
                completeness: breakdown.completeness,
                degenerate_range: breakdown.degenerate_range,
            }
        }
        (None, _) => RunStatus::Skipped {
            reason: "series file has no station code in its name".to_string(),
        },
        (Some(_), Err(e)) => {
            warn!("Cannot read series {}: {}", source, e);
            RunStatus::Failed {
                error: e.to_string(),
            }
        }
    };

    StationRunSummary {
        source,
        station_code,
        variable: Some(variable),
        stats: DiscardStats::default(),
        status,
    }
}

/// Write every successfully aggregated, non-empty report
fn write_reports(
    reports: &BTreeMap<Variable, Result<CompletenessReport>>,
    year: i32,
    out_root: &Path,
    summary: &mut RunSummary,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for (variable, report) in reports {
        match report {
            Ok(report) if !report.is_empty() => {
                let path = report_path(out_root, *variable, year);
                ReportWriter::write_report(report, &path)?;
                info!("Completeness report written to {}", path.display());
                written.push(path);
            }
            Ok(_) => {}
            Err(e) => {
                error!("Report for {} {} not written: {}", variable, year, e);
                summary
                    .failed_reports
                    .push(format!("{} {}: {}", variable, year, e));
            }
        }
    }

    Ok(written)
}
