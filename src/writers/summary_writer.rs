use crate::error::{ProcessingError, Result};
use crate::processors::RunSummary;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Persists the per-category discard accounting of a run as JSON
pub struct SummaryWriter;

impl SummaryWriter {
    pub fn write_summary(summary: &RunSummary, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, summary).map_err(|e| {
            ProcessingError::InvalidFormat(format!("Cannot serialise run summary: {}", e))
        })?;
        writer.flush()?;
        Ok(())
    }
}
