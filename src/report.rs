//! Indented text report over the accumulated section tree
//!
//! The renderer is a pure function over the timer's path map. Nesting depth
//! is recomputed on every render by walking `parent_path` links upward to the
//! root label, so paths rebuilt after a reset never see a stale cached depth.
//! Structural faults surface as a [`ReportError`]; the timer turns those into
//! a full reset plus a single failure line instead of propagating them.

use crate::record::SectionRecord;
use std::collections::HashMap;
use thiserror::Error;

/// Fixed prefix of the single-line failure report
pub const FAILURE_PREFIX: &str = "[section report failed] ";

/// One indentation unit per nesting level
const INDENT: &str = "    ";

/// Structural faults encountered while computing the report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// A record's parent chain references a path that was never recorded
    #[error("section {path:?} references unknown parent {parent:?}")]
    DanglingParent { path: String, parent: String },

    /// A record's parent chain never reaches the root label
    #[error("parent chain of section {path:?} does not terminate")]
    ParentCycle { path: String },

    /// A section was begun but no cycle ever completed, so it has no average
    #[error("section {path:?} has no completed samples")]
    NoSamples { path: String },

    /// The insertion-order index names a path with no record behind it
    #[error("section {path:?} is indexed but not recorded")]
    MissingRecord { path: String },
}

/// Nesting depth of `path` below the root label (0 = directly under root)
pub(crate) fn depth_of(
    root_label: &str,
    records: &HashMap<String, SectionRecord>,
    path: &str,
) -> Result<usize, ReportError> {
    let record = records.get(path).ok_or_else(|| ReportError::MissingRecord {
        path: path.to_string(),
    })?;

    let mut depth = 0usize;
    let mut parent = record.parent_path();
    while parent != root_label {
        depth += 1;
        // The walk can visit at most one record per hop; anything longer
        // means the chain loops back on itself.
        if depth > records.len() {
            return Err(ReportError::ParentCycle {
                path: path.to_string(),
            });
        }
        parent = records
            .get(parent)
            .ok_or_else(|| ReportError::DanglingParent {
                path: path.to_string(),
                parent: parent.to_string(),
            })?
            .parent_path();
    }
    Ok(depth)
}

/// Render the accumulated sections as an indented text report
///
/// One line per record in first-begin order: the leaf name padded to the
/// longest leaf name across all records, the completed-cycle count, and the
/// mean duration in seconds to four decimals. A header line names the root
/// label.
pub(crate) fn render(
    root_label: &str,
    order: &[String],
    records: &HashMap<String, SectionRecord>,
) -> Result<String, ReportError> {
    let width = order
        .iter()
        .filter_map(|path| records.get(path))
        .map(|record| record.name().len())
        .max()
        .unwrap_or(0);

    let mut out = format!("Section report: {root_label}\n");
    for path in order {
        let record = records.get(path).ok_or_else(|| ReportError::MissingRecord {
            path: path.clone(),
        })?;
        let depth = depth_of(root_label, records, path)?;
        let average = record.average().ok_or_else(|| ReportError::NoSamples {
            path: path.clone(),
        })?;

        out.push_str(&INDENT.repeat(depth));
        out.push_str(&format!(
            "{:<width$}: Count: {}, Avg: {:.4}\n",
            record.name(),
            record.count(),
            average.as_secs_f64(),
        ));
    }
    Ok(out)
}
