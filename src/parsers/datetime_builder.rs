use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

/// Why a date/time pair could not be combined into an instant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatetimeError {
    #[error("unrecognised date '{0}'")]
    Date(String),

    #[error("unrecognised time '{0}'")]
    Time(String),
}

/// Parse a station date. Year-first when the leading field has four digits
/// (`2023/01/31`, `2023-01-31`), otherwise day-first (`31/01/2023`).
pub fn parse_date(raw: &str) -> Result<NaiveDate, DatetimeError> {
    let raw = raw.trim();
    let separator = if raw.contains('/') { '/' } else { '-' };
    let year_first = raw
        .split(separator)
        .next()
        .is_some_and(|lead| lead.len() == 4 && lead.bytes().all(|b| b.is_ascii_digit()));

    let format = match (year_first, separator) {
        (true, '/') => "%Y/%m/%d",
        (true, _) => "%Y-%m-%d",
        (false, '/') => "%d/%m/%Y",
        (false, _) => "%d-%m-%Y",
    };

    NaiveDate::parse_from_str(raw, format).map_err(|_| DatetimeError::Date(raw.to_string()))
}

/// Parse an hour field: `HHMM`, `HH:MM` or `HH:MM:SS`, optionally suffixed with `UTC`
pub fn parse_time(raw: &str) -> Result<NaiveTime, DatetimeError> {
    let trimmed = raw.trim();
    let bare = trimmed
        .strip_suffix("UTC")
        .or_else(|| trimmed.strip_suffix("utc"))
        .unwrap_or(trimmed)
        .trim_end();

    let format = match bare.matches(':').count() {
        0 if bare.len() == 4 => "%H%M",
        1 => "%H:%M",
        2 => "%H:%M:%S",
        _ => return Err(DatetimeError::Time(trimmed.to_string())),
    };

    NaiveTime::parse_from_str(bare, format).map_err(|_| DatetimeError::Time(trimmed.to_string()))
}

/// Combine separate date and time fields into a single instant
pub fn build_instant(date: &str, time: &str) -> Result<NaiveDateTime, DatetimeError> {
    Ok(parse_date(date)?.and_time(parse_time(time)?))
}
