//! Process-wide default timer and scope sugar
//!
//! One default [`SectionTimer`] lives for the whole process behind a mutex,
//! so scattered call sites can instrument without threading a timer handle
//! through every signature. It is a convenience wrapper over the explicit
//! API; tests and libraries that need isolation should construct their own
//! [`SectionTimer`].
//!
//! Call [`init`] once at startup to pick the root label (otherwise the
//! default label applies on first use) and [`teardown`] at shutdown to close
//! the timer. The begin/end protocol still assumes one logical call stream;
//! the mutex keeps individual calls sound, but interleaving begin/end pairs
//! from multiple threads corrupts the nest order.

use crate::section_timer::SectionTimer;
use std::path::Path;
use std::sync::{Mutex, OnceLock, PoisonError};

static DEFAULT: OnceLock<Mutex<SectionTimer>> = OnceLock::new();

fn default_timer() -> &'static Mutex<SectionTimer> {
    DEFAULT.get_or_init(|| Mutex::new(SectionTimer::default()))
}

/// Run `f` against the process-wide default timer
pub fn with<R>(f: impl FnOnce(&mut SectionTimer) -> R) -> R {
    let mut guard = default_timer()
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
}

/// Install a fresh default timer rooted at `root_label`
///
/// Replaces whatever instance was installed before, including a closed one.
pub fn init(root_label: &str) {
    with(|timer| *timer = SectionTimer::new(root_label));
}

/// Close the default timer; subsequent begin/end calls become no-ops
pub fn teardown() {
    with(SectionTimer::close);
}

/// [`SectionTimer::begin`] on the default timer
pub fn begin(name: &str) {
    with(|timer| timer.begin(name));
}

/// [`SectionTimer::end`] on the default timer
pub fn end() {
    with(SectionTimer::end);
}

/// [`SectionTimer::end_named`] on the default timer
pub fn end_named(name: &str) {
    with(|timer| timer.end_named(name));
}

/// [`SectionTimer::reset`] on the default timer
pub fn reset() {
    with(SectionTimer::reset);
}

/// [`SectionTimer::set_device_sync`] on the default timer
pub fn set_device_sync(enabled: bool) {
    with(|timer| timer.set_device_sync(enabled));
}

/// [`SectionTimer::render`] on the default timer
pub fn render() -> String {
    with(SectionTimer::render)
}

/// [`SectionTimer::save`] on the default timer
pub fn save(path: impl AsRef<Path>) -> anyhow::Result<()> {
    with(|timer| timer.save(path))
}

/// RAII section over the default timer
///
/// Begins its section on construction and ends it when dropped, so the end
/// call runs on every exit path: fall-through, early return, and unwinding.
#[must_use = "the section ends when the guard is dropped"]
pub struct ScopedSection {
    name: String,
}

impl ScopedSection {
    pub fn new(name: &str) -> Self {
        begin(name);
        Self {
            name: name.to_string(),
        }
    }
}

impl Drop for ScopedSection {
    fn drop(&mut self) {
        end_named(&self.name);
    }
}

/// Bracket `f` in a section on the default timer
///
/// The function-call analogue of a begin/end pair: exactly one cycle is
/// recorded for `name` around `f`, whatever exit path `f` takes.
pub fn measure<R>(name: &str, f: impl FnOnce() -> R) -> R {
    let _section = ScopedSection::new(name);
    f()
}
