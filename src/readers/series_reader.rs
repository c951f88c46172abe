use crate::error::Result;
use crate::models::{Observation, ProcessedSeries, SERIES_DATETIME_FORMAT};
use crate::processors::StreamingDeduplicator;
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Reads a processed `datetime,value` series back into memory
pub struct SeriesReader;

impl SeriesReader {
    pub fn read_series(path: &Path) -> Result<ProcessedSeries> {
        let file = File::open(path)?;
        Self::read_from(file)
    }

    /// Rows that fail to parse are skipped; repeated instants keep the first row
    pub fn read_from<R: Read>(source: R) -> Result<ProcessedSeries> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(source);

        let mut deduplicator = StreamingDeduplicator::new();
        for record in reader.records() {
            let record = record?;
            let parsed = match (record.get(0), record.get(1)) {
                (Some(datetime), Some(value)) => NaiveDateTime::parse_from_str(datetime.trim(), SERIES_DATETIME_FORMAT)
                    .ok()
                    .zip(value.trim().parse::<f64>().ok().filter(|v| v.is_finite())),
                _ => None,
            };

            match parsed {
                Some((instant, value)) => {
                    deduplicator.push(Observation::new(instant, value));
                }
                None => debug!("Skipping unreadable series row {:?}", record),
            }
        }

        Ok(deduplicator.finish())
    }
}
