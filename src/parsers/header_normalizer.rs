//! Header canonicalisation and column lookup.
//!
//! INMET changes header spelling between yearly archives (accents, case,
//! spacing before units). Every header is reduced to a canonical key once per
//! file and columns are resolved against those keys, never per row.

use crate::error::{ProcessingError, Result};
use crate::models::Variable;
use std::collections::HashMap;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Reduce a raw header to its canonical key: accents stripped, lowercase,
/// whitespace collapsed and trimmed, no spaces inside or before parentheses.
pub fn canonical_key(raw: &str) -> String {
    let folded: String = raw
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();

    let mut key = String::with_capacity(folded.len());
    let mut pending_space = false;
    for c in folded.chars() {
        if c.is_whitespace() {
            pending_space = !key.is_empty();
            continue;
        }
        if pending_space && c != '(' && c != ')' && !key.ends_with('(') {
            key.push(' ');
        }
        pending_space = false;
        key.push(c);
    }

    key
}

/// Column positions needed to extract one variable from a station file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSelection {
    pub date: usize,
    pub time: usize,
    pub value: usize,
}

/// Lookup from canonical key to the raw header and its position
#[derive(Debug, Clone)]
pub struct HeaderMap {
    raw_headers: Vec<String>,
    canonical: Vec<String>,
    index: HashMap<String, usize>,
}

impl HeaderMap {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let raw_headers: Vec<String> = headers.into_iter().map(|h| h.as_ref().to_string()).collect();
        let canonical: Vec<String> = raw_headers.iter().map(|h| canonical_key(h)).collect();

        let mut index = HashMap::with_capacity(canonical.len());
        for (position, key) in canonical.iter().enumerate() {
            if !key.is_empty() {
                index.entry(key.clone()).or_insert(position);
            }
        }

        Self {
            raw_headers,
            canonical,
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.raw_headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw_headers.is_empty()
    }

    /// Position of the column whose canonical key equals `key`
    pub fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Raw header text for a canonical key
    pub fn raw_header(&self, key: &str) -> Option<&str> {
        self.position(key).map(|p| self.raw_headers[p].as_str())
    }

    fn find(&self, predicate: impl Fn(&str) -> bool) -> Option<usize> {
        self.canonical.iter().position(|key| predicate(key))
    }

    pub fn date_column(&self) -> Option<usize> {
        self.position("data")
            .or_else(|| self.find(|key| key.starts_with("data(")))
    }

    pub fn time_column(&self) -> Option<usize> {
        self.find(|key| key.starts_with("hora"))
    }

    pub fn variable_column(&self, variable: Variable) -> Option<usize> {
        variable
            .header_aliases()
            .iter()
            .find_map(|alias| self.position(alias))
            .or_else(|| self.find(|key| key.contains(variable.header_fragment())))
    }

    /// Resolve date, time and value columns for a variable
    pub fn select(&self, variable: Variable, station_code: &str) -> Result<ColumnSelection> {
        let schema_error = || ProcessingError::Schema {
            station_code: station_code.to_string(),
            variable: variable.to_string(),
        };

        Ok(ColumnSelection {
            date: self.date_column().ok_or_else(schema_error)?,
            time: self.time_column().ok_or_else(schema_error)?,
            value: self.variable_column(variable).ok_or_else(schema_error)?,
        })
    }
}
