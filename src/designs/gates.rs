//! Two-input logic gates, each its own top module with ports `a`, `b`, `y`.

use crate::device::{Inputs, Port, SignalValue};
use crate::error::DeviceFault;
use crate::harness::{Clocking, Reset};
use crate::script::{Expectation, Script};
use crate::testbench::Testbench;

pub static PORTS: [Port; 3] = [
    Port::input("a", 1),
    Port::input("b", 1),
    Port::output("y", 1),
];

/// Input pairs in the order they are applied.
pub const TRUTH_TABLE_INPUTS: [(SignalValue, SignalValue); 4] = [(0, 0), (1, 0), (0, 1), (1, 1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    And,
    Or,
    Nand,
    Nor,
}

impl GateKind {
    pub const ALL: [GateKind; 4] = [GateKind::And, GateKind::Or, GateKind::Nand, GateKind::Nor];

    pub fn design(self) -> &'static str {
        match self {
            GateKind::And => "and_gate",
            GateKind::Or => "or_gate",
            GateKind::Nand => "nand_gate",
            GateKind::Nor => "nor_gate",
        }
    }

    pub fn from_design(design: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.design() == design)
    }

    fn expression(self) -> &'static str {
        match self {
            GateKind::And => "a & b",
            GateKind::Or => "a | b",
            GateKind::Nand => "!(a & b)",
            GateKind::Nor => "!(a | b)",
        }
    }

    /// Expected `y` for the current `a`, `b`.
    pub fn expected(self, inputs: &Inputs<'_>) -> Result<SignalValue, DeviceFault> {
        let (a, b) = (inputs.get("a")?, inputs.get("b")?);
        Ok(match self {
            GateKind::And => a & b,
            GateKind::Or => a | b,
            GateKind::Nand => !(a & b) & 1,
            GateKind::Nor => !(a | b) & 1,
        })
    }
}

/// Exhaustive truth table; `a`, `b` and `y` are watched on every row.
pub fn script(kind: GateKind) -> Script {
    TRUTH_TABLE_INPUTS.iter().enumerate().fold(
        Script::new(format!("{} truth table", kind.design()), TRUTH_TABLE_INPUTS.len()),
        |script, (row, &(a, b))| {
            script
                .drive(row, [("a", a), ("b", b)])
                .expect(Expectation::formula(row, "y", kind.expression(), move |inputs| {
                    kind.expected(inputs)
                }))
                .watch(row, "a")
                .watch(row, "b")
                .watch(row, "y")
        },
    )
}

pub fn testbench(kind: GateKind) -> Testbench {
    Testbench {
        design: kind.design(),
        ports: &PORTS,
        clocking: Clocking::Combinational,
        reset: Reset::none(),
        script: script(kind),
        trace_file: None,
    }
}
