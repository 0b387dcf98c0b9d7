//! Integration tests for the hierarchical section timer
//!
//! Exercises the public begin/end protocol end to end: nesting, loop
//! re-entry, fault handling, close/reset lifecycle, and report rendering.

use medir::section_timer::{SectionFault, SectionTimer, CLOSED_TEXT};
use std::thread::sleep;
use std::time::Duration;

fn timer() -> SectionTimer {
    SectionTimer::with_barrier("root", None)
}

#[test]
fn test_nested_loop_scenario_accumulates_expected_counts() {
    let mut timer = timer();

    timer.begin("Main");
    timer.begin("Sub1");
    timer.end_named("Sub1");
    for _ in 0..10 {
        timer.begin("Sub2");
        timer.begin("Sub2-1");
        timer.end();
        timer.end_named("Sub2");
    }
    timer.end_named("Main");

    assert_eq!(timer.record("root/Main").unwrap().count(), 1);
    assert_eq!(timer.record("root/Main/Sub1").unwrap().count(), 1);
    assert_eq!(timer.record("root/Main/Sub2").unwrap().count(), 10);
    assert_eq!(timer.record("root/Main/Sub2/Sub2-1").unwrap().count(), 10);
}

#[test]
fn test_nested_loop_scenario_renders_one_line_per_path() {
    let mut timer = timer();

    timer.begin("Main");
    timer.begin("Sub1");
    timer.end_named("Sub1");
    for _ in 0..3 {
        timer.begin("Sub2");
        timer.begin("Sub2-1");
        timer.end();
        timer.end_named("Sub2");
    }
    timer.end_named("Main");

    let out = timer.render();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "Section report: root");
    assert!(lines[1].trim_start().starts_with("Main"));
    assert!(lines[2].starts_with("    Sub1"));
    assert!(lines[3].starts_with("    Sub2 "));
    assert!(lines[4].starts_with("        Sub2-1"));
    assert!(lines[3].contains("Count: 3"));
}

#[test]
fn test_mismatch_scenario_pops_without_recording() {
    let mut timer = timer();

    timer.begin("A");
    let fault = timer.try_end(Some("B")).unwrap_err();
    assert_eq!(
        fault,
        SectionFault::TagMismatch {
            expected: "A".to_string(),
            found: "B".to_string(),
        }
    );
    assert_eq!(timer.open_depth(), 0);
    assert_eq!(timer.record("root/A").unwrap().count(), 0);
}

#[test]
fn test_underflow_reports_without_mutating() {
    let mut timer = timer();
    timer.begin("work");
    timer.end();

    assert_eq!(timer.try_end(None), Err(SectionFault::StackUnderflow));
    assert_eq!(timer.len(), 1);
    assert_eq!(timer.open_depth(), 0);
    assert_eq!(timer.record("root/work").unwrap().count(), 1);
}

#[test]
fn test_average_reflects_elapsed_time() {
    let mut timer = timer();
    timer.begin("sleepy");
    sleep(Duration::from_millis(20));
    timer.end_named("sleepy");

    let avg = timer.record("root/sleepy").unwrap().average().unwrap();
    assert!(avg >= Duration::from_millis(20));
    assert!(avg < Duration::from_secs(2));
}

#[test]
fn test_loop_reentry_average_over_all_cycles() {
    let mut timer = timer();
    for _ in 0..5 {
        timer.begin("tick");
        sleep(Duration::from_millis(2));
        timer.end_named("tick");
    }

    let record = timer.record("root/tick").unwrap();
    assert_eq!(record.count(), 5);
    let mean = record.average().unwrap();
    let sum: Duration = record.samples().iter().sum();
    assert_eq!(mean, sum / 5);
}

#[test]
fn test_close_freezes_all_state() {
    let mut timer = timer();
    timer.begin("before");
    timer.end();
    timer.close();

    timer.begin("after");
    timer.end_named("after");
    assert!(timer.is_empty());
    assert_eq!(timer.open_depth(), 0);
    assert_eq!(timer.render(), CLOSED_TEXT);
}

#[test]
fn test_reset_yields_fresh_open_state() {
    let mut timer = timer();
    timer.begin("a");
    timer.begin("b");
    timer.reset();

    assert!(timer.is_empty());
    assert_eq!(timer.open_depth(), 0);
    assert_eq!(timer.current_parent(), timer.root_label().to_string());

    timer.begin("a");
    timer.end();
    assert_eq!(timer.record("root/a").unwrap().count(), 1);
}

#[test]
fn test_render_fault_discards_data_and_reopens() {
    let mut timer = timer();
    timer.begin("finished");
    timer.end();
    // A section that never ended has no average; the renderer treats that
    // as a structural fault and heals by resetting.
    timer.begin("unfinished");

    let out = timer.render();
    assert!(out.starts_with("[section report failed] "));
    assert!(out.contains("unfinished"));

    assert!(!timer.is_closed());
    assert!(timer.is_empty());
    assert_eq!(timer.render(), "Section report: root\n");
}

#[test]
fn test_save_writes_rendered_report() {
    let mut timer = timer();
    timer.begin("work");
    timer.end();

    let file = tempfile::NamedTempFile::new().unwrap();
    timer.save(file.path()).unwrap();

    let written = std::fs::read_to_string(file.path()).unwrap();
    assert!(written.starts_with("Section report: root\n"));
    assert!(written.contains("work"));
}

#[test]
fn test_save_overwrites_previous_content() {
    let mut timer = timer();
    timer.begin("work");
    timer.end();

    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), "stale content that should disappear").unwrap();
    timer.save(file.path()).unwrap();

    let written = std::fs::read_to_string(file.path()).unwrap();
    assert!(!written.contains("stale content"));
}

#[test]
fn test_save_after_close_writes_nothing() {
    let mut timer = timer();
    timer.close();

    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), "untouched").unwrap();
    timer.save(file.path()).unwrap();

    let written = std::fs::read_to_string(file.path()).unwrap();
    assert_eq!(written, "untouched");
}

#[test]
fn test_measure_method_handles_nested_sections() {
    let mut timer = timer();
    let total = timer.measure("outer", |t| {
        let mut acc = 0u32;
        for _ in 0..4 {
            acc += t.measure("inner", |_| 1u32);
        }
        acc
    });

    assert_eq!(total, 4);
    assert_eq!(timer.record("root/outer").unwrap().count(), 1);
    assert_eq!(timer.record("root/outer/inner").unwrap().count(), 4);
}
