use crate::cli::args::{Cli, Commands, WorkerArgs};
use crate::config::ProcessingConfig;
use crate::error::{ProcessingError, Result};
use crate::processors::{ParallelProcessor, YearOutcome};
use crate::utils::filename::year_from_archive_name;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

pub async fn run(cli: Cli) -> Result<()> {
    setup_logging(&cli)?;

    match &cli.command {
        Commands::Process {
            input,
            year,
            out_root,
            workers,
        } => {
            let year = match year.or_else(|| year_from_archive_name(input)) {
                Some(year) => year,
                None => {
                    return Err(ProcessingError::Config(format!(
                        "Cannot infer the year from {}; pass --year",
                        input.display()
                    )))
                }
            };

            let processor = build_processor(&cli, workers)?;
            println!("Processing INMET stations for {}...", year);
            println!("Input: {}", input.display());
            println!("Output root: {}", out_root.display());

            let outcome = processor.process_year(input, year, out_root).await?;
            print_outcome(&outcome);
        }

        Commands::ProcessDirectory {
            input_dir,
            out_root,
            workers,
        } => {
            let years = discover_years(input_dir)?;
            if years.is_empty() {
                println!("No <YYYY>.zip archives or <YYYY>/ directories in {}", input_dir.display());
                return Ok(());
            }

            let processor = build_processor(&cli, workers)?;
            println!(
                "Processing {} years from {}...",
                years.len(),
                input_dir.display()
            );

            for (year, input) in &years {
                info!("Processing {} from {}", year, input.display());
                let outcome = processor.process_year(input, *year, out_root).await?;
                print_outcome(&outcome);
            }
        }

        Commands::Report {
            year,
            out_root,
            workers,
        } => {
            let processor = build_processor(&cli, workers)?;
            let out_root_for_task = out_root.clone();
            let year = *year;

            let outcome = tokio::task::spawn_blocking(move || {
                processor.rebuild_reports(year, &out_root_for_task)
            })
            .await??;

            if outcome.written_reports.is_empty() {
                println!("No processed series found for {} under {}", year, out_root.display());
            }
            for path in &outcome.written_reports {
                println!("Report written: {}", path.display());
            }
            for failure in &outcome.summary.failed_reports {
                println!("Report not written: {}", failure);
            }
        }
    }

    Ok(())
}

/// Set up structured logging: stderr always, plus a plain-text file when requested
fn setup_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let log_level = cli.log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("inmet_processor={}", log_level)));

    let file_layer = match &cli.log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = File::create(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

fn build_processor(cli: &Cli, workers: &WorkerArgs) -> Result<ParallelProcessor> {
    let config = ProcessingConfig::load(cli.config.as_deref())?
        .with_overrides(workers.max_workers, workers.chunk_size)?;

    debug!("Effective configuration: {:?}", config);
    println!(
        "Workers: {}, Chunk size: {}",
        config.max_workers, config.chunk_size
    );

    Ok(ParallelProcessor::from_config(&config).with_progress(!cli.quiet))
}

/// Yearly inputs in a directory, keyed by year; a zip and a directory for
/// the same year keep whichever sorts first
fn discover_years(input_dir: &Path) -> Result<BTreeMap<i32, PathBuf>> {
    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(input_dir)? {
        let path = entry?.path();
        let is_zip = path.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("zip"));
        if is_zip || path.is_dir() {
            candidates.push(path);
        }
    }
    candidates.sort();

    let mut years: BTreeMap<i32, PathBuf> = BTreeMap::new();
    for path in candidates {
        let Some(year) = year_from_archive_name(&path) else {
            debug!("Ignoring {}: not a yearly archive", path.display());
            continue;
        };
        if let Some(existing) = years.get(&year) {
            warn!(
                "Year {} found twice; using {} and ignoring {}",
                year,
                existing.display(),
                path.display()
            );
            continue;
        }
        years.insert(year, path);
    }

    Ok(years)
}

fn print_outcome(outcome: &YearOutcome) {
    println!("\n{}", outcome.summary.generate_summary());
    for (variable, report) in &outcome.reports {
        if let Ok(report) = report {
            if let Some(mean) = report.mean_completeness() {
                println!(
                    "{} report: {} stations, mean completeness {:.2}",
                    variable,
                    report.len(),
                    mean
                );
            }
        }
    }
    for path in &outcome.written_reports {
        println!("Report written: {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discover_years() -> Result<()> {
        let dir = TempDir::new()?;
        std::fs::write(dir.path().join("2021.zip"), b"")?;
        std::fs::create_dir(dir.path().join("2022"))?;
        std::fs::create_dir(dir.path().join("notes"))?;
        std::fs::write(dir.path().join("2023.txt"), b"")?;

        let years = discover_years(dir.path())?;

        assert_eq!(years.keys().copied().collect::<Vec<_>>(), vec![2021, 2022]);
        assert_eq!(years[&2022], dir.path().join("2022"));
        Ok(())
    }
}
