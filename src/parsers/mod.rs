pub mod datetime_builder;
pub mod header_normalizer;
pub mod row_extractor;
pub mod value_parser;

pub use datetime_builder::{build_instant, DatetimeError};
pub use header_normalizer::{canonical_key, ColumnSelection, HeaderMap};
pub use row_extractor::{Extracted, RawFields, RowExtractor};
pub use value_parser::{parse_value, ParsedValue};
