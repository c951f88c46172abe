pub mod completeness;
pub mod deduplicator;
pub mod discard_stats;
pub mod parallel_processor;
pub mod report_aggregator;
pub mod station_pipeline;

pub use completeness::{CompletenessBreakdown, CompletenessCalculator};
pub use deduplicator::{Admission, StreamingDeduplicator};
pub use discard_stats::{DiscardReason, DiscardStats, RunStatus, RunSummary, StationRunSummary};
pub use parallel_processor::{ParallelProcessor, YearOutcome};
pub use report_aggregator::ReportAggregator;
pub use station_pipeline::{StationPipeline, VariableOutcome, VariableSeries};
