//! UART transceiver with its transmitter looped back into its receiver.
//!
//! Only the final decoded byte is checked: after a fixed number of cycles
//! `out_data` must equal whatever `in_data` holds at that moment.

use crate::device::{Port, SignalValue};
use crate::harness::{Clocking, Reset};
use crate::script::{Expectation, Script};
use crate::testbench::Testbench;

pub const NAME: &str = "uart";

pub const CYCLES: usize = 20;

pub const TEST_BYTE: SignalValue = 199;

pub static PORTS: [Port; 6] = [
    Port::input("clk", 1),
    Port::input("rst", 1),
    Port::input("in_data", 8),
    Port::output("txd", 1),
    Port::output("rxd", 1),
    Port::output("out_data", 8),
];

pub fn script() -> Script {
    let last = CYCLES - 1;
    Script::new("uart loopback", CYCLES)
        .drive(0, [("in_data", TEST_BYTE)])
        .expect(
            Expectation::formula(last, "out_data", "in_data", |inputs| inputs.get("in_data"))
                .named("UART loopback"),
        )
        .watch(last, "in_data")
        .watch(last, "out_data")
}

/// Clock low, then a rising edge with reset held, then release. The first
/// cycle's low phase evaluates the release.
pub fn reset() -> Reset {
    Reset::new([("clk", 0)])
        .then([("clk", 1), ("rst", 1)])
        .release("rst", 0)
}

pub fn testbench() -> Testbench {
    Testbench {
        design: NAME,
        ports: &PORTS,
        clocking: Clocking::rising("clk"),
        reset: reset(),
        script: script(),
        trace_file: None,
    }
}
