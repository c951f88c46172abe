use crate::parsers::header_normalizer::ColumnSelection;
use csv::StringRecord;

/// Raw date, time and value text pulled from one station row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFields<'a> {
    pub date: &'a str,
    pub time: &'a str,
    pub value: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extracted<'a> {
    Complete(RawFields<'a>),
    /// Date or time is absent or blank, so the row cannot be placed in time
    Unplaced,
    /// Date and time are present but the value cell is absent or blank
    MissingValue { date: &'a str, time: &'a str },
}

/// Pulls the configured columns out of a station row. Pure; never fails.
#[derive(Debug, Clone, Copy)]
pub struct RowExtractor {
    columns: ColumnSelection,
}

impl RowExtractor {
    pub fn new(columns: ColumnSelection) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> ColumnSelection {
        self.columns
    }

    pub fn extract<'a>(&self, row: &'a StringRecord) -> Extracted<'a> {
        let field = |position: usize| row.get(position).map(str::trim).filter(|s| !s.is_empty());

        let (Some(date), Some(time)) = (field(self.columns.date), field(self.columns.time)) else {
            return Extracted::Unplaced;
        };

        match field(self.columns.value) {
            Some(value) => Extracted::Complete(RawFields { date, time, value }),
            None => Extracted::MissingValue { date, time },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> RowExtractor {
        RowExtractor::new(ColumnSelection {
            date: 0,
            time: 1,
            value: 2,
        })
    }

    #[test]
    fn test_extract_complete_row() {
        let row = StringRecord::from(vec!["2023/01/01", "0000 UTC", "1,2", "887,4", ""]);

        assert_eq!(
            extractor().extract(&row),
            Extracted::Complete(RawFields {
                date: "2023/01/01",
                time: "0000 UTC",
                value: "1,2",
            })
        );
    }

    #[test]
    fn test_blank_value_is_missing() {
        let row = StringRecord::from(vec!["2023/01/01", "0100 UTC", "  "]);

        assert_eq!(
            extractor().extract(&row),
            Extracted::MissingValue {
                date: "2023/01/01",
                time: "0100 UTC"
            }
        );
    }

    #[test]
    fn test_ragged_row_without_value_column() {
        let row = StringRecord::from(vec!["2023/01/01", "0200 UTC"]);

        assert!(matches!(
            extractor().extract(&row),
            Extracted::MissingValue { .. }
        ));
    }

    #[test]
    fn test_blank_date_or_time_is_unplaced() {
        let no_date = StringRecord::from(vec!["", "0200 UTC", "0,0"]);
        let no_time = StringRecord::from(vec!["2023/01/01"]);

        assert_eq!(extractor().extract(&no_date), Extracted::Unplaced);
        assert_eq!(extractor().extract(&no_time), Extracted::Unplaced);
    }
}
