//! Fakes for driving the harness without Verilator.
//!
//! None of these computes what a design computes. They replay recorded
//! answers or copy an input to an output, which is enough to exercise
//! stepping, reset ordering, checking and reporting.
#![allow(dead_code)]

use hdl_harness::designs::{alu8, gates, impl_top, led, uart, GateKind};
use hdl_harness::{DeviceFault, HarnessConfig, Port, PortMap, SignalValue, SimulatedDevice, Testbench};

pub type Assignments = Vec<(&'static str, SignalValue)>;

/// Output rule of a fake, run on every `eval`.
pub trait Behavior {
    fn update(&mut self, ports: &mut PortMap) -> Result<(), DeviceFault>;
}

pub struct Fake<B: Behavior> {
    ports: PortMap,
    behavior: B,
    evals: u64,
}

impl<B: Behavior> Fake<B> {
    pub fn new(name: &str, ports: &'static [Port], behavior: B) -> Self {
        Self {
            ports: PortMap::new(name, ports),
            behavior,
            evals: 0,
        }
    }

    pub fn evals(&self) -> u64 {
        self.evals
    }

    pub fn behavior(&self) -> &B {
        &self.behavior
    }
}

impl<B: Behavior> SimulatedDevice for Fake<B> {
    fn name(&self) -> &str {
        self.ports.device()
    }

    fn ports(&self) -> &[Port] {
        self.ports.ports()
    }

    fn set_input(&mut self, signal: &str, value: SignalValue) -> Result<(), DeviceFault> {
        self.ports.drive(signal, value)
    }

    fn input(&self, signal: &str) -> Result<SignalValue, DeviceFault> {
        self.ports.input(signal)
    }

    fn output(&self, signal: &str) -> Result<SignalValue, DeviceFault> {
        self.ports.output(signal)
    }

    fn eval(&mut self) -> Result<(), DeviceFault> {
        self.evals += 1;
        self.behavior.update(&mut self.ports)
    }
}

/// Combinational lookup of recorded (inputs, outputs) rows. Inputs with no
/// recorded row are a backend fault.
#[derive(Debug, Clone, Default)]
pub struct KnownAnswers {
    rows: Vec<(Assignments, Assignments)>,
}

impl KnownAnswers {
    pub fn row<I, O>(mut self, inputs: I, outputs: O) -> Self
    where
        I: IntoIterator<Item = (&'static str, SignalValue)>,
        O: IntoIterator<Item = (&'static str, SignalValue)>,
    {
        self.rows
            .push((inputs.into_iter().collect(), outputs.into_iter().collect()));
        self
    }
}

impl Behavior for KnownAnswers {
    fn update(&mut self, ports: &mut PortMap) -> Result<(), DeviceFault> {
        for (inputs, outputs) in &self.rows {
            let mut hit = true;
            for &(signal, value) in inputs {
                hit &= ports.input(signal)? == value;
            }
            if hit {
                for &(signal, value) in outputs {
                    ports.publish(signal, value)?;
                }
                return Ok(());
            }
        }
        let values = ports.values().to_vec();
        Err(DeviceFault::Backend {
            device: ports.device().to_string(),
            message: format!("no recorded answer for inputs {values:?}"),
        })
    }
}

/// Rising edge detector on one input.
#[derive(Debug, Clone, Copy, Default)]
struct Edges {
    last: SignalValue,
}

impl Edges {
    fn rising(&mut self, level: SignalValue) -> bool {
        let rose = self.last == 0 && level == 1;
        self.last = level;
        rose
    }
}

/// Copies `from` to `to` on every rising edge once `latency` edges have
/// passed since reset. Reset is synchronous: it only counts on a rising
/// edge, and before the first one `to` is never written.
#[derive(Debug, Clone)]
pub struct Echo {
    clock: &'static str,
    reset: &'static str,
    from: &'static str,
    to: &'static str,
    latency: u32,
    edges: Edges,
    since_reset: Option<u32>,
    pub edges_in_reset: u32,
}

impl Echo {
    pub fn new(clock: &'static str, reset: &'static str, from: &'static str, to: &'static str, latency: u32) -> Self {
        Self {
            clock,
            reset,
            from,
            to,
            latency,
            edges: Edges::default(),
            since_reset: None,
            edges_in_reset: 0,
        }
    }
}

impl Behavior for Echo {
    fn update(&mut self, ports: &mut PortMap) -> Result<(), DeviceFault> {
        if !self.edges.rising(ports.input(self.clock)?) {
            return Ok(());
        }
        if ports.input(self.reset)? == 1 {
            self.edges_in_reset += 1;
            self.since_reset = Some(0);
            return ports.publish(self.to, 0);
        }
        if let Some(count) = self.since_reset.as_mut() {
            *count += 1;
            if *count >= self.latency {
                let value = ports.input(self.from)?;
                ports.publish(self.to, value)?;
            }
        }
        Ok(())
    }
}

/// Plays back recorded levels of one output, one per rising edge. Reset is
/// level sensitive and rewinds the recording.
#[derive(Debug, Clone)]
pub struct Replay {
    clock: &'static str,
    reset: &'static str,
    output: &'static str,
    samples: Vec<SignalValue>,
    next: usize,
    edges: Edges,
}

impl Replay {
    pub fn new(clock: &'static str, reset: &'static str, output: &'static str, samples: Vec<SignalValue>) -> Self {
        Self {
            clock,
            reset,
            output,
            samples,
            next: 0,
            edges: Edges::default(),
        }
    }
}

impl Behavior for Replay {
    fn update(&mut self, ports: &mut PortMap) -> Result<(), DeviceFault> {
        let rising = self.edges.rising(ports.input(self.clock)?);
        if ports.input(self.reset)? == 1 {
            self.next = 0;
            return ports.publish(self.output, 0);
        }
        if rising {
            let value = self.samples.get(self.next).copied().unwrap_or(0);
            self.next += 1;
            ports.publish(self.output, value)?;
        }
        Ok(())
    }
}

/// Presents `uart_rxd` on `uart_tx_data` with `uart_tx_en` raised for the
/// one clock after it changes. Never busy.
#[derive(Debug, Clone, Default)]
pub struct Handshake {
    edges: Edges,
    last_rxd: SignalValue,
}

impl Behavior for Handshake {
    fn update(&mut self, ports: &mut PortMap) -> Result<(), DeviceFault> {
        if self.edges.rising(ports.input("clk")?) {
            let rxd = ports.input("uart_rxd")?;
            ports.publish("uart_tx_en", (rxd != self.last_rxd).into())?;
            ports.publish("uart_tx_data", rxd)?;
            self.last_rxd = rxd;
        }
        ports.publish("uart_tx_busy", 0)
    }
}

/// Recorded `y` per row of `gates::TRUTH_TABLE_INPUTS`.
pub const GATE_TABLES: [(GateKind, [SignalValue; 4]); 4] = [
    (GateKind::And, [0, 0, 0, 1]),
    (GateKind::Or, [0, 1, 1, 1]),
    (GateKind::Nand, [1, 1, 1, 0]),
    (GateKind::Nor, [1, 0, 0, 0]),
];

/// LED levels recorded over the first cycles after reset.
pub const LED_LEVELS: [SignalValue; 9] = [0, 0, 0, 1, 1, 1, 1, 0, 0];

pub const UART_LATENCY: u32 = 11;

pub fn alu8_answers() -> Fake<KnownAnswers> {
    let (add, sub, mul, div) = (0, 1, 2, 3);
    let answers = [
        ((add, 0x64, 0x18), 0x7C),
        ((sub, 0x64, 0x18), 0x4C),
        ((mul, 0x64, 0x18), 0x60),
        ((mul, 0x9, 0xF), 0x87),
        ((div, 0xC0, 0x8), 0x18),
        ((div, 0xC0, 0x0), 0xFF),
    ];
    let table = answers
        .into_iter()
        .fold(KnownAnswers::default(), |table, ((op, a, b), result)| {
            table.row([("opcode", op), ("A", a), ("B", b)], [("result", result)])
        });
    Fake::new(alu8::NAME, &alu8::PORTS, table)
}

/// A gate named `design` that answers with `ys`.
pub fn gate_answers(design: &str, ys: [SignalValue; 4]) -> Fake<KnownAnswers> {
    let table = gates::TRUTH_TABLE_INPUTS
        .iter()
        .zip(ys)
        .fold(KnownAnswers::default(), |table, (&(a, b), y)| {
            table.row([("a", a), ("b", b)], [("y", y)])
        });
    Fake::new(design, &gates::PORTS, table)
}

pub fn gate(kind: GateKind) -> Fake<KnownAnswers> {
    let ys = GATE_TABLES
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, ys)| *ys)
        .unwrap_or_default();
    gate_answers(kind.design(), ys)
}

pub fn led() -> Fake<Replay> {
    Fake::new(led::NAME, &led::PORTS, Replay::new("clock", "reset", "led", LED_LEVELS.to_vec()))
}

pub fn uart(latency: u32) -> Fake<Echo> {
    Fake::new(uart::NAME, &uart::PORTS, Echo::new("clk", "rst", "in_data", "out_data", latency))
}

pub fn impl_top() -> Fake<Handshake> {
    Fake::new(impl_top::NAME, &impl_top::PORTS, Handshake::default())
}

/// A fake for every design in `designs::all()`.
pub fn fake_for(bench: &Testbench) -> Option<Box<dyn SimulatedDevice>> {
    if let Some(kind) = GateKind::from_design(bench.design) {
        return Some(Box::new(gate(kind)));
    }
    match bench.design {
        alu8::NAME => Some(Box::new(alu8_answers())),
        led::NAME => Some(Box::new(led())),
        uart::NAME => Some(Box::new(uart(UART_LATENCY))),
        impl_top::NAME => Some(Box::new(impl_top())),
        _ => None,
    }
}

pub fn untraced() -> HarnessConfig {
    HarnessConfig::default().with_tracing(false)
}
