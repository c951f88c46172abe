pub mod latin1;
pub mod series_reader;
pub mod station_reader;

pub use latin1::Latin1Reader;
pub use series_reader::SeriesReader;
pub use station_reader::{StationReader, StationStream};
