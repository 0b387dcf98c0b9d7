//! Per-section timing accumulator
//!
//! A [`SectionRecord`] is one bucket in the section hierarchy: the ordered
//! samples collected for a single path, plus the back-link to the enclosing
//! section's path. Records are owned exclusively by the timer that created
//! them; calling code only observes them through accessors.

use std::time::{Duration, Instant};

/// Accumulated timing samples for a single section path
#[derive(Debug, Clone)]
pub struct SectionRecord {
    /// Leaf label as supplied by the caller
    name: String,
    /// Full path of the enclosing section at creation time
    parent_path: String,
    /// Elapsed durations, one per completed begin/end cycle
    samples: Vec<Duration>,
    /// Timestamp of the most recent unmatched begin
    pending_start: Option<Instant>,
}

impl SectionRecord {
    pub(crate) fn new(name: &str, parent_path: &str) -> Self {
        Self {
            name: name.to_string(),
            parent_path: parent_path.to_string(),
            samples: Vec::new(),
            pending_start: None,
        }
    }

    /// Leaf label of this section
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full path of the enclosing section
    pub fn parent_path(&self) -> &str {
        &self.parent_path
    }

    /// Number of completed begin/end cycles
    pub fn count(&self) -> usize {
        self.samples.len()
    }

    /// Elapsed durations in completion order
    pub fn samples(&self) -> &[Duration] {
        &self.samples
    }

    /// Total time across all completed cycles
    pub fn total(&self) -> Duration {
        self.samples.iter().sum()
    }

    /// Arithmetic mean of the collected samples, `None` when no cycle has
    /// completed yet
    pub fn average(&self) -> Option<Duration> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.total() / self.samples.len() as u32)
    }

    /// Mark the start of a new cycle
    ///
    /// Overwrites any prior unmatched start. The timer only calls this after
    /// the previous cycle for this path was closed, so overwriting is the
    /// loop re-entry case, not data loss.
    pub(crate) fn start_timing(&mut self, t: Instant) {
        self.pending_start = Some(t);
    }

    /// Close the current cycle and append its elapsed time
    ///
    /// Call ordering is guaranteed by the timer; a stop without a pending
    /// start records nothing.
    pub(crate) fn stop_timing(&mut self, t: Instant) {
        if let Some(start) = self.pending_start.take() {
            self.samples.push(t.duration_since(start));
        }
    }
}
