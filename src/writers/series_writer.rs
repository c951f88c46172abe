use crate::error::Result;
use crate::models::ProcessedSeries;
use crate::utils::constants::SERIES_HEADER;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes a processed series as `datetime,value` CSV
pub struct SeriesWriter;

impl SeriesWriter {
    /// Write to `path`, creating parent directories. An empty series still
    /// produces a header-only file.
    pub fn write_series(series: &ProcessedSeries, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        Self::write_to(series, BufWriter::new(file))
    }

    pub fn write_to<W: Write>(series: &ProcessedSeries, sink: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(sink);
        writer.write_record(SERIES_HEADER)?;

        for observation in series {
            writer.write_record([
                observation.formatted_instant(),
                format_value(observation.value),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }
}

/// Shortest round-trip form, keeping one decimal for whole numbers
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Observation;
    use crate::processors::StreamingDeduplicator;
    use chrono::NaiveDate;

    #[test]
    fn test_series_csv_layout() -> Result<()> {
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let series = StreamingDeduplicator::deduplicate([
            Observation::new(day.and_hms_opt(1, 0, 0).unwrap(), 24.6),
            Observation::new(day.and_hms_opt(0, 0, 0).unwrap(), 0.0),
        ]);

        let mut buffer = Vec::new();
        SeriesWriter::write_to(&series, &mut buffer)?;

        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "datetime,value\n2025-01-01T00:00:00,0.0\n2025-01-01T01:00:00,24.6\n"
        );
        Ok(())
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0.2), "0.2");
        assert_eq!(format_value(-3.0), "-3.0");
        assert_eq!(format_value(1013.7), "1013.7");
    }
}
