//! Board-level UART top: two switches, a receive input and the transmitter
//! handshake. Nothing is checked. The run is counted in clock toggles, every
//! toggle is traced, and `uart_tx_data` is reported whenever the
//! transmitter presents a byte (`uart_tx_en` high, `uart_tx_busy` low).

use crate::device::Port;
use crate::harness::{Clocking, Reset};
use crate::script::Script;
use crate::testbench::Testbench;

pub const NAME: &str = "impl_top";

pub const TOGGLES: usize = 100;

/// Bytes fed to `uart_rxd`, one every `BYTE_SPACING` toggles.
pub const GREETING: &[u8] = b"Hello Wor";

/// First toggle evaluated with a greeting byte on `uart_rxd`.
pub const FIRST_BYTE_AT: usize = 11;

pub const BYTE_SPACING: usize = 10;

pub const TRACE_FILE: &str = "impl_top.vcd";

pub static PORTS: [Port; 7] = [
    Port::input("clk", 1),
    Port::input("sw_0", 1),
    Port::input("sw_1", 1),
    Port::input("uart_rxd", 8),
    Port::output("uart_tx_en", 1),
    Port::output("uart_tx_busy", 1),
    Port::output("uart_tx_data", 8),
];

pub fn script() -> Script {
    let script = Script::new("impl_top greeting", TOGGLES).per_phase();
    GREETING
        .iter()
        .enumerate()
        .fold(script, |script, (i, &byte)| {
            script.drive(FIRST_BYTE_AT + i * BYTE_SPACING, [("uart_rxd", byte.into())])
        })
        .watch_every_when("uart_tx_data", [("uart_tx_en", 1), ("uart_tx_busy", 0)])
}

pub fn testbench() -> Testbench {
    Testbench {
        design: NAME,
        ports: &PORTS,
        clocking: Clocking::rising("clk"),
        reset: Reset::preset([("clk", 0), ("sw_0", 1), ("sw_1", 0), ("uart_rxd", 0)]),
        script: script(),
        trace_file: Some(TRACE_FILE),
    }
}
