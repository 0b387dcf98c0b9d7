//! Medir - Hierarchical section timer for in-process performance profiling
//!
//! Calling code brackets named sections of execution with begin/end calls;
//! nesting of those calls builds a tree of per-section timing records, loop
//! re-entry accumulates counts and averages into a single record per path,
//! and rendering produces an indented report of the whole tree. An optional
//! CUDA barrier can be synchronized before every timestamp capture so
//! device-side work is measured to completion rather than to dispatch.

pub mod device;
pub mod global;
pub mod json_output;
pub mod record;
pub mod report;
pub mod section_timer;
