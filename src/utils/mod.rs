pub mod constants;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use filename::{report_path, series_dir, series_path, summary_path, year_from_archive_name};
pub use progress::ProgressReporter;
