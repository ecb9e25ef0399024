//! LED blinker: clocked, synchronous output, no functional checks beyond
//! reset. The LED level is observed on every cycle.
//!
//! Reset is evaluated with the clock low and released without another
//! evaluation, so the release lands on the low phase of the first cycle.

use crate::device::Port;
use crate::harness::{Clocking, Reset};
use crate::script::{Expectation, Script};
use crate::testbench::Testbench;

pub const NAME: &str = "LED";

pub const CYCLES: usize = 30;

pub static PORTS: [Port; 3] = [
    Port::input("clock", 1),
    Port::input("reset", 1),
    Port::output("led", 1),
];

pub fn script() -> Script {
    Script::new("led blink", CYCLES)
        .expect(Expectation::literal(0, "led", 0).named("LED low after reset"))
        .watch_every("led")
}

pub fn testbench() -> Testbench {
    Testbench {
        design: NAME,
        ports: &PORTS,
        clocking: Clocking::rising("clock"),
        reset: Reset::new([("clock", 0), ("reset", 1)]).release("reset", 0),
        script: script(),
        trace_file: None,
    }
}
