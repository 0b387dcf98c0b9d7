//! Nested section walkthrough over a loop-heavy workload
//!
//! Run with `cargo run --example nested_sections`.

use medir::global;
use std::thread::sleep;
use std::time::Duration;

fn main() {
    global::init("root");

    global::begin("Main");
    sleep(Duration::from_millis(100));

    global::begin("Sub1");
    sleep(Duration::from_millis(100));
    global::end_named("Sub1");

    for _ in 0..10 {
        global::begin("Sub2");
        sleep(Duration::from_millis(10));
        global::begin("Sub2-1");
        sleep(Duration::from_millis(10));
        global::end();
        global::end_named("Sub2");
    }
    global::end_named("Main");

    global::measure("Tail", || sleep(Duration::from_millis(50)));

    print!("{}", global::render());
}
