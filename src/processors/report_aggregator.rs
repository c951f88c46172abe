use crate::error::Result;
use crate::models::{CompletenessReport, CompletenessResult, Variable};
use crossbeam::channel::{self, Receiver, Sender};
use std::collections::BTreeMap;
use tracing::{error, info};

/// Collects completeness results from concurrent station workers.
///
/// Workers only hold a [`Sender`]; the aggregator is the single writer of the
/// reports and builds them once all workers are done.
pub struct ReportAggregator {
    year: i32,
    sender: Sender<CompletenessResult>,
    receiver: Receiver<CompletenessResult>,
}

impl ReportAggregator {
    pub fn new(year: i32) -> Self {
        let (sender, receiver) = channel::unbounded();
        Self {
            year,
            sender,
            receiver,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Handle for a worker to submit results through
    pub fn sender(&self) -> Sender<CompletenessResult> {
        self.sender.clone()
    }

    pub fn submit(&self, result: CompletenessResult) {
        // the receiver lives as long as self, so the channel cannot be disconnected
        let _ = self.sender.send(result);
    }

    /// Build one report per variable. A duplicate station code fails that
    /// variable's report only.
    pub fn finish(self) -> BTreeMap<Variable, Result<CompletenessReport>> {
        drop(self.sender);

        let mut reports: BTreeMap<Variable, Result<CompletenessReport>> = BTreeMap::new();
        for result in self.receiver.iter() {
            let variable = result.variable;
            let report = reports
                .entry(variable)
                .or_insert_with(|| Ok(CompletenessReport::new(variable, self.year)));

            let inserted = match report {
                Ok(current) => current.insert(result),
                Err(_) => continue,
            };
            if let Err(e) = inserted {
                error!("Discarding {} {} report: {}", variable, self.year, e);
                *report = Err(e);
            }
        }

        for (variable, report) in &reports {
            if let Ok(report) = report {
                info!(
                    "Aggregated {} stations for {} {}",
                    report.len(),
                    variable,
                    self.year
                );
            }
        }

        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use std::thread;

    #[test]
    fn test_concurrent_workers_single_report() {
        let aggregator = ReportAggregator::new(2023);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let sender = aggregator.sender();
                thread::spawn(move || {
                    sender
                        .send(CompletenessResult::new(
                            format!("A{:03}", 100 - i),
                            Variable::TotalPrecipitation,
                            0.5,
                        ))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut reports = aggregator.finish();
        let report = reports.remove(&Variable::TotalPrecipitation).unwrap().unwrap();
        let codes: Vec<String> = report.results().map(|r| r.station_code).collect();

        assert_eq!(report.len(), 8);
        assert_eq!(codes.first().map(String::as_str), Some("A093"));
        assert_eq!(codes.last().map(String::as_str), Some("A100"));
    }

    #[test]
    fn test_conflict_fails_only_its_report() {
        let aggregator = ReportAggregator::new(2023);
        aggregator.submit(CompletenessResult::new("A001", Variable::TotalPrecipitation, 0.9));
        aggregator.submit(CompletenessResult::new("A001", Variable::TotalPrecipitation, 0.1));
        aggregator.submit(CompletenessResult::new("A002", Variable::TotalPrecipitation, 0.7));
        aggregator.submit(CompletenessResult::new("A001", Variable::AirTemperature, 0.9));

        let mut reports = aggregator.finish();

        assert!(matches!(
            reports.remove(&Variable::TotalPrecipitation),
            Some(Err(ProcessingError::AggregationConflict { .. }))
        ));
        let temperature = reports.remove(&Variable::AirTemperature).unwrap().unwrap();
        assert_eq!(temperature.get("A001"), Some(0.9));
    }

    #[test]
    fn test_no_results_no_reports() {
        let reports = ReportAggregator::new(2023).finish();
        assert!(reports.is_empty());
    }
}
