use crate::error::Result;
use crate::models::CompletenessReport;
use crate::utils::constants::{REPORT_DELIMITER, REPORT_HEADER};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes `station_code;completeness` reports, one row per station
pub struct ReportWriter;

impl ReportWriter {
    pub fn write_report(report: &CompletenessReport, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        Self::write_to(report, BufWriter::new(file))
    }

    pub fn write_to<W: Write>(report: &CompletenessReport, sink: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(REPORT_DELIMITER)
            .from_writer(sink);
        writer.write_record(REPORT_HEADER)?;

        for result in report.results() {
            writer.write_record([result.station_code.as_str(), result.formatted().as_str()])?;
        }

        writer.flush()?;
        Ok(())
    }
}
