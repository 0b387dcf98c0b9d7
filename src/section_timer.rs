//! Hierarchical section timer
//!
//! The [`SectionTimer`] owns the open-section stack and the path-to-record
//! mapping. Calling code brackets regions of execution with `begin`/`end`;
//! nesting of those calls builds a tree of [`SectionRecord`]s keyed by full
//! path, and re-entering the same path (the loop case) accumulates into a
//! single record instead of creating duplicates.
//!
//! The timer assumes one logical call stream drives the begin/end protocol
//! in strict nest order and performs no internal locking. Mismatched calls
//! are reported as recoverable faults, never as panics; an instrumentation
//! layer must not be able to abort its host program.

use crate::device::{self, DeviceBarrier};
use crate::record::SectionRecord;
use crate::report;
use anyhow::Context;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use thiserror::Error;

/// Root label used when none is given
pub const DEFAULT_ROOT_LABEL: &str = "root";

/// Text returned by `render` after `close`
pub const CLOSED_TEXT: &str = "Section timer closed.\n";

/// Recoverable faults raised by mismatched begin/end calls
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SectionFault {
    /// `end` was called with no open section
    #[error("no open section to end")]
    StackUnderflow,

    /// `end` named a section other than the innermost open one
    #[error("section name mismatch: innermost open section is {expected:?}, got {found:?}")]
    TagMismatch { expected: String, found: String },
}

/// Stateful engine owning the open-section stack and the path map
pub struct SectionTimer {
    /// Namespace under which all top-level sections nest
    root_label: String,
    /// Full path to accumulated record
    records: HashMap<String, SectionRecord>,
    /// Paths in first-begin order; always exactly the keys of `records`
    order: Vec<String>,
    /// Currently open paths, innermost last
    stack: Vec<String>,
    /// Path new sections nest under: the stack top, or the root label
    current_parent: String,
    /// Once set, every mutating operation is a no-op
    closed: bool,
    /// Issue a device barrier before every timestamp capture
    sync_before_timestamp: bool,
    /// Barrier capability, absent when no backend is available
    barrier: Option<Box<dyn DeviceBarrier>>,
}

impl std::fmt::Debug for SectionTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionTimer")
            .field("root_label", &self.root_label)
            .field("sections", &self.order.len())
            .field("open_depth", &self.stack.len())
            .field("closed", &self.closed)
            .field("sync_before_timestamp", &self.sync_before_timestamp)
            .field("barrier", &self.barrier.as_ref().map(|b| b.backend()))
            .finish()
    }
}

impl Default for SectionTimer {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_LABEL)
    }
}

impl SectionTimer {
    /// Create a timer rooted at `root_label`, detecting the device barrier
    /// capability for this process
    pub fn new(root_label: &str) -> Self {
        Self::with_barrier(root_label, device::detect())
    }

    /// Create a timer with an explicitly injected barrier (or none)
    ///
    /// Tests and embedders with their own device management inject here
    /// instead of relying on detection.
    pub fn with_barrier(root_label: &str, barrier: Option<Box<dyn DeviceBarrier>>) -> Self {
        Self {
            root_label: root_label.to_string(),
            records: HashMap::new(),
            order: Vec::new(),
            stack: Vec::new(),
            current_parent: root_label.to_string(),
            closed: false,
            sync_before_timestamp: false,
            barrier,
        }
    }

    /// Root namespace label
    pub fn root_label(&self) -> &str {
        &self.root_label
    }

    /// Whether `close` was called
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether a device barrier runs before every timestamp capture
    pub fn device_sync(&self) -> bool {
        self.sync_before_timestamp
    }

    /// Accumulated record for a full path, if that path was ever begun
    pub fn record(&self, path: &str) -> Option<&SectionRecord> {
        self.records.get(path)
    }

    /// Full paths in first-begin order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of distinct section paths recorded
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no section was recorded since the last reset
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of currently open sections
    pub fn open_depth(&self) -> usize {
        self.stack.len()
    }

    /// Path the next `begin` will nest under
    pub fn current_parent(&self) -> &str {
        &self.current_parent
    }

    /// Nesting depth of a recorded path (0 = directly under root)
    pub fn depth(&self, path: &str) -> Option<usize> {
        report::depth_of(&self.root_label, &self.records, path).ok()
    }

    fn timestamp(&self) -> Instant {
        if self.sync_before_timestamp {
            if let Some(barrier) = &self.barrier {
                if let Err(err) = barrier.synchronize() {
                    tracing::warn!(
                        backend = barrier.backend(),
                        "device barrier failed, timestamp may include in-flight work: {err:#}"
                    );
                }
            }
        }
        Instant::now()
    }

    /// Open a section named `name` under the current parent
    ///
    /// First entry for a path creates its record; re-entry reuses it and
    /// starts another cycle. No-op when closed or when `name` is empty.
    pub fn begin(&mut self, name: &str) {
        if self.closed {
            return;
        }
        if name.is_empty() {
            tracing::warn!("begin called with an empty section name; ignored");
            return;
        }

        let t = self.timestamp();
        let path = format!("{}/{}", self.current_parent, name);
        match self.records.get_mut(&path) {
            Some(record) => record.start_timing(t),
            None => {
                let mut record = SectionRecord::new(name, &self.current_parent);
                record.start_timing(t);
                self.records.insert(path.clone(), record);
                self.order.push(path.clone());
            }
        }
        self.stack.push(path.clone());
        self.current_parent = path;
    }

    /// Close the innermost open section
    ///
    /// Faults are logged and leave the accumulated data untouched.
    pub fn end(&mut self) {
        if let Err(fault) = self.try_end(None) {
            tracing::warn!(%fault, "end ignored");
        }
    }

    /// Close the innermost open section, checking it is named `name`
    ///
    /// Faults are logged; see [`Self::try_end`] for their exact effect on
    /// timer state.
    pub fn end_named(&mut self, name: &str) {
        if let Err(fault) = self.try_end(Some(name)) {
            tracing::warn!(%fault, "end ignored");
        }
    }

    /// Fallible form of `end`/`end_named`
    ///
    /// On `StackUnderflow` nothing changes. On `TagMismatch` the innermost
    /// path stays popped, its record is not updated, and `current_parent` is
    /// left pointing at the popped path even though it is no longer open.
    /// That last part is deliberate: after a mismatch the caller's nest
    /// order is already unreliable, and later sections nest under the
    /// popped path until it is begun again or the timer is reset.
    pub fn try_end(&mut self, name: Option<&str>) -> Result<(), SectionFault> {
        if self.closed {
            return Ok(());
        }

        let t = self.timestamp();
        let Some(top) = self.stack.pop() else {
            return Err(SectionFault::StackUnderflow);
        };

        if let Some(name) = name {
            let leaf = top.rsplit('/').next().unwrap_or_default();
            if leaf != name {
                return Err(SectionFault::TagMismatch {
                    expected: leaf.to_string(),
                    found: name.to_string(),
                });
            }
        }

        let Some(record) = self.records.get_mut(&top) else {
            // A stacked path always has a record behind it; reaching this
            // arm means the two structures diverged.
            return Err(SectionFault::StackUnderflow);
        };
        record.stop_timing(t);
        self.current_parent = record.parent_path().to_string();
        Ok(())
    }

    /// Bracket `f` in a section, re-lending the timer for nested sections
    pub fn measure<R>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.begin(name);
        let result = f(self);
        self.end_named(name);
        result
    }

    /// Discard all records and open sections, keeping the root label
    ///
    /// Always succeeds, closed or not; `close` uses it internally.
    pub fn reset(&mut self) {
        let label = self.root_label.clone();
        self.reset_with_label(&label);
    }

    /// Discard all records and open sections, re-rooting at `root_label`
    pub fn reset_with_label(&mut self, root_label: &str) {
        self.records.clear();
        self.order.clear();
        self.stack.clear();
        self.root_label = root_label.to_string();
        self.current_parent = self.root_label.clone();
        tracing::debug!(root = %self.root_label, "section timer reset");
    }

    /// Reset, then disable all future mutation
    ///
    /// Terminal: there is no reopen. `begin`/`end` become no-ops and
    /// `render` yields the fixed closed-state text.
    pub fn close(&mut self) {
        self.reset();
        self.closed = true;
        tracing::debug!("section timer closed");
    }

    /// Enable or disable the device barrier before timestamp captures
    ///
    /// Forced off when no barrier capability is present.
    pub fn set_device_sync(&mut self, enabled: bool) {
        match (&self.barrier, enabled) {
            (Some(barrier), true) => {
                self.sync_before_timestamp = true;
                tracing::debug!(backend = barrier.backend(), "device sync enabled");
            }
            (None, true) => {
                self.sync_before_timestamp = false;
                tracing::debug!("no device barrier available; device sync stays off");
            }
            (_, false) => self.sync_before_timestamp = false,
        }
    }

    /// Render the accumulated sections as an indented text report
    ///
    /// Never fails: a structural fault while computing the report discards
    /// all accumulated data (keeping the root label) and yields a single
    /// failure line instead, leaving the timer open and empty for reuse.
    pub fn render(&mut self) -> String {
        if self.closed {
            return CLOSED_TEXT.to_string();
        }
        match report::render(&self.root_label, &self.order, &self.records) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(%err, "report failed; discarding accumulated sections");
                self.reset();
                format!("{}{}", report::FAILURE_PREFIX, err)
            }
        }
    }

    /// Write the rendered report to `path`, overwriting existing content
    ///
    /// Logs a notice and writes nothing when closed.
    pub fn save(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        if self.closed {
            tracing::info!("section timer closed; skipping save");
            return Ok(());
        }
        let path = path.as_ref();
        let text = self.render();
        std::fs::write(path, text)
            .with_context(|| format!("failed to write section report to {}", path.display()))?;
        tracing::debug!(path = %path.display(), "section report saved");
        Ok(())
    }
}
