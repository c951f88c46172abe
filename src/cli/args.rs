use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "inmet-processor")]
#[command(about = "INMET station data processor: hourly series and completeness reports")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Only log warnings and hide progress bars"
    )]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Configuration file (TOML or JSON)")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

/// Overrides shared by the processing commands
#[derive(Args, Debug, Clone, Default)]
pub struct WorkerArgs {
    #[arg(long, help = "Worker threads [default: number of CPUs]")]
    pub max_workers: Option<usize>,

    #[arg(long, help = "Rows per chunk when streaming station files [default: 10000]")]
    pub chunk_size: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process one year's zip archive or directory of station files
    Process {
        #[arg(short, long, help = "Input zip archive or directory")]
        input: PathBuf,

        #[arg(short, long, help = "Year of the data [default: taken from the input name]")]
        year: Option<i32>,

        #[arg(short, long, help = "Output root directory")]
        out_root: PathBuf,

        #[command(flatten)]
        workers: WorkerArgs,
    },

    /// Process every `<YYYY>.zip` or `<YYYY>/` found in a directory
    ProcessDirectory {
        #[arg(short, long, help = "Directory containing yearly archives")]
        input_dir: PathBuf,

        #[arg(short, long, help = "Output root directory")]
        out_root: PathBuf,

        #[command(flatten)]
        workers: WorkerArgs,
    },

    /// Rebuild completeness reports from processed series already on disk
    Report {
        #[arg(short, long)]
        year: i32,

        #[arg(short, long, help = "Output root directory")]
        out_root: PathBuf,

        #[command(flatten)]
        workers: WorkerArgs,
    },
}
