/// Literal INMET uses for an intentionally absent measurement
pub const MISSING_SENTINEL: &str = "-9999";

/// Station file layout
pub const FIELD_DELIMITER: u8 = b';';
pub const DEFAULT_PREAMBLE_LINES: usize = 8;
pub const STATION_FILE_PREFIX: &str = "INMET_";
pub const STATION_FILE_EXTENSION: &str = "csv";

/// Output layout
pub const STATIONS_DIR: &str = "inmet_stations";
pub const PROCESSED_DIR: &str = "processed";
pub const SERIES_HEADER: [&str; 2] = ["datetime", "value"];
pub const REPORT_HEADER: [&str; 2] = ["station_code", "completeness"];
pub const REPORT_DELIMITER: u8 = b';';

/// Processing defaults
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Completeness is measured against hourly reporting
pub const SECONDS_PER_OBSERVATION: i64 = 3600;
