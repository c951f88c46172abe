use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Output datetime layout for processed series files
pub const SERIES_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A single normalised hourly observation for one variable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub instant: NaiveDateTime,
    pub value: f64,
}

impl Observation {
    pub fn new(instant: NaiveDateTime, value: f64) -> Self {
        Self { instant, value }
    }

    pub fn formatted_instant(&self) -> String {
        self.instant.format(SERIES_DATETIME_FORMAT).to_string()
    }
}

/// Observations ordered by instant with no instant repeated.
///
/// Only built by [`crate::processors::StreamingDeduplicator::finish`], so the
/// ordering and uniqueness hold for every value of this type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedSeries {
    observations: Vec<Observation>,
}

impl ProcessedSeries {
    pub(crate) fn from_sorted_unique(observations: Vec<Observation>) -> Self {
        debug_assert!(observations.windows(2).all(|w| w[0].instant < w[1].instant));
        Self { observations }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_instant(&self) -> Option<NaiveDateTime> {
        self.observations.first().map(|o| o.instant)
    }

    pub fn last_instant(&self) -> Option<NaiveDateTime> {
        self.observations.last().map(|o| o.instant)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }
}

impl<'a> IntoIterator for &'a ProcessedSeries {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_formatted_instant() {
        let instant = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap();
        let observation = Observation::new(instant, 24.6);

        assert_eq!(observation.formatted_instant(), "2025-01-01T07:00:00");
    }

    #[test]
    fn test_series_bounds() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let series = ProcessedSeries::from_sorted_unique(vec![
            Observation::new(day.and_hms_opt(0, 0, 0).unwrap(), 1.0),
            Observation::new(day.and_hms_opt(5, 0, 0).unwrap(), 2.0),
        ]);

        assert_eq!(series.len(), 2);
        assert_eq!(series.first_instant(), day.and_hms_opt(0, 0, 0));
        assert_eq!(series.last_instant(), day.and_hms_opt(5, 0, 0));
        assert!(ProcessedSeries::default().is_empty());
    }
}
