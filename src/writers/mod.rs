pub mod report_writer;
pub mod series_writer;
pub mod summary_writer;

pub use report_writer::ReportWriter;
pub use series_writer::SeriesWriter;
pub use summary_writer::SummaryWriter;
