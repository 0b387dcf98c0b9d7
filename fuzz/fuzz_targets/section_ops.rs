#![no_main]

use libfuzzer_sys::fuzz_target;
use medir::section_timer::SectionTimer;

// Interpret the input as a sequence of timer operations. Whatever order the
// bytes dictate, the timer must never panic; mismatched calls degrade to
// logged faults and the renderer heals itself.
fuzz_target!(|data: &[u8]| {
    let mut timer = SectionTimer::with_barrier("root", None);

    for chunk in data.chunks(2) {
        let op = chunk[0] % 6;
        let name = format!("s{}", chunk.get(1).copied().unwrap_or(0) % 4);
        match op {
            0 => timer.begin(&name),
            1 => timer.end(),
            2 => timer.end_named(&name),
            3 => { let _ = timer.render(); }
            4 => timer.reset(),
            _ => timer.set_device_sync(chunk.get(1).copied().unwrap_or(0) % 2 == 0),
        }
    }

    let _ = timer.render();
});
