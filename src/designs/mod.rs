//! Testbenches for the designs in the RTL tree.

pub mod alu8;
pub mod gates;
pub mod impl_top;
pub mod led;
pub mod uart;

use crate::testbench::Testbench;

pub use gates::GateKind;

/// Every testbench, in the order the runner executes them.
pub fn all() -> Vec<Testbench> {
    let mut benches = vec![alu8::testbench()];
    benches.extend(GateKind::ALL.iter().map(|&kind| gates::testbench(kind)));
    benches.push(led::testbench());
    benches.push(uart::testbench());
    benches.push(impl_top::testbench());
    benches
}

pub fn find(design: &str) -> Option<Testbench> {
    all().into_iter().find(|bench| bench.design == design)
}
