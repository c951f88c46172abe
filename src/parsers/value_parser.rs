use crate::utils::constants::MISSING_SENTINEL;

/// Result of parsing one locale-formatted measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedValue {
    Value(f64),
    /// Defined absence: blank, sentinel, NaN or null marker
    Missing,
    /// Text that is neither a number nor a known absence marker
    Unparseable,
}

impl ParsedValue {
    pub fn value(self) -> Option<f64> {
        match self {
            ParsedValue::Value(v) => Some(v),
            ParsedValue::Missing | ParsedValue::Unparseable => None,
        }
    }
}

/// Parse a comma-decimal value such as `24,6` or `-,4`
pub fn parse_value(raw: &str) -> ParsedValue {
    let trimmed = raw.trim();

    if trimmed.is_empty()
        || trimmed == MISSING_SENTINEL
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("null")
    {
        return ParsedValue::Missing;
    }

    match trimmed.replace(',', ".").parse::<f64>() {
        Ok(v) if v.is_finite() => ParsedValue::Value(v),
        Ok(_) => ParsedValue::Missing,
        Err(_) => ParsedValue::Unparseable,
    }
}
