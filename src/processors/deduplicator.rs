//! Exactly-once retention per instant across a chunked row stream.
//!
//! The seen-instant set and the retained observations live for the whole of
//! one station+variable run and are carried across chunk boundaries; chunking
//! only bounds the transient row buffers that feed this accumulator.

use crate::models::{Observation, ProcessedSeries};
use chrono::NaiveDateTime;
use std::collections::HashSet;
use tracing::debug;

/// What happened to a row offered to the deduplicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// First row for this instant and it carries a value
    Retained,
    /// First row for this instant but without a usable value; the instant
    /// is still claimed so later rows cannot fill it
    ClaimedWithoutValue,
    /// The instant was already claimed by an earlier row
    Duplicate,
}

#[derive(Debug, Default)]
pub struct StreamingDeduplicator {
    seen: HashSet<NaiveDateTime>,
    retained: Vec<Observation>,
    duplicates: usize,
}

impl StreamingDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer one placed row. First occurrence by stream order wins, whether or
    /// not a later duplicate carries a better value.
    pub fn offer(&mut self, instant: NaiveDateTime, value: Option<f64>) -> Admission {
        if !self.seen.insert(instant) {
            self.duplicates += 1;
            debug!("Skipping duplicate instant {}", instant);
            return Admission::Duplicate;
        }

        match value {
            Some(value) => {
                self.retained.push(Observation::new(instant, value));
                Admission::Retained
            }
            None => Admission::ClaimedWithoutValue,
        }
    }

    /// Offer a valued observation; true when it was retained
    pub fn push(&mut self, observation: Observation) -> bool {
        self.offer(observation.instant, Some(observation.value)) == Admission::Retained
    }

    /// Feed one chunk, returning how many observations it contributed
    pub fn extend_chunk<I>(&mut self, chunk: I) -> usize
    where
        I: IntoIterator<Item = Observation>,
    {
        chunk.into_iter().filter(|o| self.push(*o)).count()
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Sort retained observations by instant; rows may arrive out of order
    pub fn finish(self) -> ProcessedSeries {
        let mut retained = self.retained;
        retained.sort_unstable_by_key(|o| o.instant);
        ProcessedSeries::from_sorted_unique(retained)
    }

    /// One-shot deduplication of an in-memory sequence
    pub fn deduplicate<I>(observations: I) -> ProcessedSeries
    where
        I: IntoIterator<Item = Observation>,
    {
        let mut deduplicator = Self::new();
        deduplicator.extend_chunk(observations);
        deduplicator.finish()
    }
}
