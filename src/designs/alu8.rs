//! 8-bit ALU: `result = A <op> B`, combinational.

use crate::device::{Port, SignalValue};
use crate::harness::{Clocking, Reset};
use crate::script::{Expectation, Script};
use crate::testbench::Testbench;

pub const NAME: &str = "ALU8";

pub static PORTS: [Port; 4] = [
    Port::input("opcode", 2),
    Port::input("A", 8),
    Port::input("B", 8),
    Port::output("result", 8),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Add = 0,
    Sub = 1,
    Mul = 2,
    Div = 3,
}

impl Opcode {
    pub const ALL: [Opcode; 4] = [Opcode::Add, Opcode::Sub, Opcode::Mul, Opcode::Div];

    pub fn value(self) -> SignalValue {
        self as SignalValue
    }

    pub fn from_value(value: SignalValue) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.value() == value)
    }
}

/// Known-answer checks. Overflow and divide-by-zero results are what the
/// device produces, asserted as literals.
pub fn script() -> Script {
    let add = Opcode::Add.value();
    let sub = Opcode::Sub.value();
    let mul = Opcode::Mul.value();
    let div = Opcode::Div.value();

    Script::new("alu8 known answers", 6)
        .drive(0, [("A", 0x64), ("B", 0x18), ("opcode", add)])
        .expect(Expectation::literal(0, "result", 0x7C).named("Addition"))
        .drive(1, [("opcode", sub)])
        .expect(Expectation::literal(1, "result", 0x4C).named("Subtraction"))
        // 0x64 * 0x18 = 0x960, truncated
        .drive(2, [("opcode", mul)])
        .expect(Expectation::literal(2, "result", 0x60).named("Multiplication"))
        .drive(3, [("A", 0x9), ("B", 0xF)])
        .expect(Expectation::literal(3, "result", 0x87).named("Multiplication"))
        .drive(4, [("opcode", div), ("A", 0xC0), ("B", 0x8)])
        .expect(Expectation::literal(4, "result", 0x18).named("Division"))
        .drive(5, [("B", 0x0)])
        .expect(Expectation::literal(5, "result", 0xFF).named("Division by zero"))
        .watch_every("result")
}

pub fn testbench() -> Testbench {
    Testbench {
        design: NAME,
        ports: &PORTS,
        clocking: Clocking::Combinational,
        reset: Reset::none(),
        script: script(),
        trace_file: None,
    }
}
