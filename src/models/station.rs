use crate::error::{ProcessingError, Result};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

static STATION_FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^INMET_([A-Z]+)_([A-Z]{2})_([A-Z]\d{3})_(.+)_(\d{2}-\d{2}-\d{4})_A_(\d{2}-\d{2}-\d{4})\.(?i:csv)$",
    )
    .expect("station filename pattern is valid")
});

static STATION_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]\d{3}$").expect("station code pattern is valid"));

const FILENAME_DATE_FORMAT: &str = "%d-%m-%Y";

/// Station identity parsed from an INMET station filename, e.g.
/// `INMET_CO_DF_A001_BRASILIA_01-01-2023_A_31-12-2023.CSV`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StationIdentity {
    pub region: String,

    #[validate(length(equal = 2))]
    pub state: String,

    #[validate(custom(function = "validate_station_code"))]
    pub code: String,

    #[validate(length(min = 1))]
    pub city: String,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

fn validate_station_code(code: &str) -> std::result::Result<(), ValidationError> {
    if STATION_CODE_RE.is_match(code) {
        Ok(())
    } else {
        Err(ValidationError::new("station_code"))
    }
}

impl StationIdentity {
    pub fn from_filename(filename: &str) -> Result<Self> {
        let captures = STATION_FILENAME_RE
            .captures(filename)
            .ok_or_else(|| ProcessingError::InvalidFilename(filename.to_string()))?;

        let parse_date = |s: &str| {
            NaiveDate::parse_from_str(s, FILENAME_DATE_FORMAT).map_err(|_| {
                ProcessingError::InvalidFilename(format!("{} (bad date '{}')", filename, s))
            })
        };

        let identity = Self {
            region: captures[1].to_string(),
            state: captures[2].to_string(),
            code: captures[3].to_string(),
            city: captures[4].to_string(),
            start_date: parse_date(&captures[5])?,
            end_date: parse_date(&captures[6])?,
        };
        identity.validate()?;

        Ok(identity)
    }

    /// Parse the identity from the final component of a path
    pub fn from_path(path: &Path) -> Result<Self> {
        let filename = path
            .file_name()
            .and_then(|f| f.to_str())
            .ok_or_else(|| ProcessingError::InvalidFilename(path.display().to_string()))?;
        Self::from_filename(filename)
    }

    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        (self.start_date, self.end_date)
    }
}
