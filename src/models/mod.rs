pub mod completeness;
pub mod observation;
pub mod station;
pub mod variable;

pub use completeness::{CompletenessReport, CompletenessResult};
pub use observation::{Observation, ProcessedSeries, SERIES_DATETIME_FORMAT};
pub use station::StationIdentity;
pub use variable::Variable;
