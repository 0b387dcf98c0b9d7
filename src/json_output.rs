//! JSON export of accumulated section statistics
//!
//! Mirrors the text report's content in machine-readable form: one entry per
//! section in first-begin order, with cycle counts and total/mean seconds.

use crate::section_timer::SectionTimer;
use serde::{Deserialize, Serialize};

/// One section in the JSON report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSection {
    /// Full path of the section
    pub path: String,
    /// Leaf label
    pub name: String,
    /// Full path of the enclosing section
    pub parent: String,
    /// Nesting depth below the root (0 = top level)
    pub depth: usize,
    /// Completed begin/end cycles
    pub count: usize,
    /// Total seconds across all cycles
    pub total_secs: f64,
    /// Mean seconds per cycle (absent when no cycle completed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_secs: Option<f64>,
}

/// Complete JSON report of a timer's accumulated sections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    /// Root namespace label
    pub root: String,
    /// Sections in first-begin order
    pub sections: Vec<JsonSection>,
}

impl JsonReport {
    /// Snapshot the timer's accumulated sections
    pub fn from_timer(timer: &SectionTimer) -> Self {
        let sections = timer
            .paths()
            .filter_map(|path| {
                let record = timer.record(path)?;
                Some(JsonSection {
                    path: path.to_string(),
                    name: record.name().to_string(),
                    parent: record.parent_path().to_string(),
                    depth: timer.depth(path).unwrap_or(0),
                    count: record.count(),
                    total_secs: record.total().as_secs_f64(),
                    avg_secs: record.average().map(|avg| avg.as_secs_f64()),
                })
            })
            .collect();
        Self {
            root: timer.root_label().to_string(),
            sections,
        }
    }

    /// Serialize to a pretty-printed JSON string
    pub fn to_string_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
