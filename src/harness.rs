//! The cycle-driven harness: owns a device, steps it, applies stimuli and
//! checks expectations, stopping at the first mismatch.

use camino::Utf8Path;
use log::{debug, error, info};

use crate::device::{Inputs, SignalValue, SimulatedDevice};
use crate::error::{DeviceFault, HarnessError, HarnessResult, Mismatch};
use crate::script::{Expectation, Script, Stepping};
use crate::trace::{TraceSession, TraceSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

impl Edge {
    /// Clock level right after this edge.
    pub fn level(self) -> SignalValue {
        match self {
            Edge::Rising => 1,
            Edge::Falling => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clocking {
    Combinational,
    Clocked { clock: &'static str, active: Edge },
}

impl Clocking {
    pub const fn rising(clock: &'static str) -> Self {
        Clocking::Clocked {
            clock,
            active: Edge::Rising,
        }
    }
}

/// What a single `step` reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Combinational settle.
    Settled,
    /// The clock edge that updates registered outputs.
    Active,
    Inactive,
}

/// Assignments made together, optionally followed by an evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetPhase {
    pub assignments: Vec<(&'static str, SignalValue)>,
    pub eval: bool,
}

/// Reset sequence run by `initialize`: phases applied in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reset {
    pub phases: Vec<ResetPhase>,
}

impl Reset {
    pub fn none() -> Self {
        Self::default()
    }

    /// Assign, then evaluate.
    pub fn new<I>(assignments: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, SignalValue)>,
    {
        Self::none().then(assignments)
    }

    /// Assign without evaluating. The first step sees the values.
    pub fn preset<I>(assignments: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, SignalValue)>,
    {
        Self {
            phases: vec![ResetPhase {
                assignments: assignments.into_iter().collect(),
                eval: false,
            }],
        }
    }

    /// Another phase: assign, then evaluate.
    pub fn then<I>(mut self, assignments: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, SignalValue)>,
    {
        self.phases.push(ResetPhase {
            assignments: assignments.into_iter().collect(),
            eval: true,
        });
        self
    }

    /// Take the device out of reset. Not evaluated unless `pulsed`.
    pub fn release(mut self, signal: &'static str, value: SignalValue) -> Self {
        self.phases.push(ResetPhase {
            assignments: vec![(signal, value)],
            eval: false,
        });
        self
    }

    /// Evaluate after the last phase as well.
    pub fn pulsed(mut self) -> Self {
        if let Some(last) = self.phases.last_mut() {
            last.eval = true;
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail(Mismatch),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub at: usize,
    pub signal: &'static str,
    pub value: SignalValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub name: String,
    pub steps_run: usize,
    pub checks_passed: usize,
    pub observations: Vec<Observation>,
}

impl RunReport {
    pub fn observed(&self, signal: &str) -> Vec<SignalValue> {
        self.observations
            .iter()
            .filter(|o| o.signal == signal)
            .map(|o| o.value)
            .collect()
    }
}

pub struct CycleDrivenHarness<D: SimulatedDevice> {
    device: D,
    clocking: Clocking,
    clock_level: SignalValue,
    steps_taken: u64,
    trace: Option<TraceSession>,
    finalized: bool,
}

impl<D: SimulatedDevice> CycleDrivenHarness<D> {
    pub fn new(device: D, clocking: Clocking) -> Self {
        Self {
            device,
            clocking,
            clock_level: 0,
            steps_taken: 0,
            trace: None,
            finalized: false,
        }
    }

    /// Record every step into `sink`. If the sink cannot be opened the
    /// harness runs untraced.
    pub fn with_trace(mut self, sink: Box<dyn TraceSink>, path: &Utf8Path, half_period: u64) -> Self {
        self.trace = TraceSession::open(sink, path, &self.device, half_period);
        self
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    pub fn trace_timestamp(&self) -> Option<u64> {
        self.trace.as_ref().map(|t| t.timestamp())
    }

    pub fn initialize(&mut self, reset: &Reset) -> Result<(), DeviceFault> {
        debug!("{}: reset {:?}", self.device.name(), reset);
        for phase in &reset.phases {
            self.apply_stimulus(&phase.assignments)?;
            if phase.eval {
                self.device.eval()?;
            }
        }
        Ok(())
    }

    /// Toggle the clock once and evaluate. Combinational devices just
    /// settle.
    pub fn step(&mut self) -> Result<Phase, DeviceFault> {
        self.drive_clock(self.clock_level ^ 1)
    }

    /// Drive the clock to its inactive level and then its active level,
    /// evaluating after each. Combinational devices settle once.
    pub fn cycle(&mut self) -> Result<Phase, DeviceFault> {
        match self.clocking {
            Clocking::Combinational => self.step(),
            Clocking::Clocked { active, .. } => {
                self.drive_clock(active.level() ^ 1)?;
                self.drive_clock(active.level())
            }
        }
    }

    fn drive_clock(&mut self, level: SignalValue) -> Result<Phase, DeviceFault> {
        let phase = match self.clocking {
            Clocking::Combinational => {
                self.device.eval()?;
                Phase::Settled
            }
            Clocking::Clocked { clock, active } => {
                self.clock_level = level;
                self.device.set_input(clock, level)?;
                self.device.eval()?;
                if level == active.level() {
                    Phase::Active
                } else {
                    Phase::Inactive
                }
            }
        };

        self.steps_taken += 1;
        self.record();
        Ok(phase)
    }

    pub fn apply_stimulus(&mut self, assignments: &[(&'static str, SignalValue)]) -> Result<(), DeviceFault> {
        for &(signal, value) in assignments {
            self.device.set_input(signal, value)?;
            if let Clocking::Clocked { clock, .. } = self.clocking {
                if clock == signal {
                    self.clock_level = value & 1;
                }
            }
        }
        Ok(())
    }

    /// Compare an output against its expectation. Formulas see the inputs as
    /// they are now, not as they were when the stimulus was applied.
    pub fn check_expectation(&self, expectation: &Expectation) -> Result<Outcome, DeviceFault> {
        let observed = self.device.output(expectation.signal)?;
        let expected = expectation
            .expected
            .resolve(&Inputs::new(&self.device))?;

        if observed == expected {
            Ok(Outcome::Pass)
        } else {
            Ok(Outcome::Fail(Mismatch {
                step: expectation.at,
                label: expectation.label(),
                signal: expectation.signal,
                expected,
                observed,
            }))
        }
    }

    pub fn run(&mut self, script: &Script) -> HarnessResult<RunReport> {
        info!("{}: running `{}` for {} steps", self.device.name(), script.name(), script.steps());

        let mut report = RunReport {
            name: script.name().to_string(),
            steps_run: 0,
            checks_passed: 0,
            observations: Vec::new(),
        };

        for at in 0..script.steps() {
            for stimulus in script.stimuli_at(at) {
                debug!("step {}: drive {:?}", at, stimulus.assignments);
                self.apply_stimulus(&stimulus.assignments)?;
            }

            match script.stepping() {
                Stepping::Cycle => self.cycle()?,
                Stepping::Phase => self.step()?,
            };

            for expectation in script.expectations_at(at) {
                match self.check_expectation(expectation)? {
                    Outcome::Pass => report.checks_passed += 1,
                    Outcome::Fail(mismatch) => {
                        error!("{}: {}", script.name(), mismatch);
                        return Err(HarnessError::Mismatch(mismatch));
                    }
                }
            }

            for watch in script.watches_at(at) {
                if !self.conditions_hold(&watch.when)? {
                    continue;
                }
                let value = self.device.read(watch.signal)?;
                info!("{} step {}: {} = {}", script.name(), at, watch.signal, value);
                report.observations.push(Observation {
                    at,
                    signal: watch.signal,
                    value,
                });
            }

            report.steps_run += 1;
        }

        info!(
            "{}: `{}` passed {} checks in {} steps",
            self.device.name(),
            script.name(),
            report.checks_passed,
            report.steps_run
        );
        Ok(report)
    }

    fn conditions_hold(&self, conditions: &[(&'static str, SignalValue)]) -> Result<bool, DeviceFault> {
        for &(signal, value) in conditions {
            if self.device.read(signal)? != value {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Release the device. Dropping the harness does the same.
    pub fn finalize(mut self) {
        self.release();
    }

    fn record(&mut self) {
        if let Some(trace) = self.trace.as_mut() {
            trace.record(&self.device);
        }
    }

    fn release(&mut self) {
        if self.finalized {
            return;
        }
        self.finalized = true;
        if let Some(trace) = self.trace.as_mut() {
            trace.close();
        }
        self.device.finalize();
        debug!("{}: finalized after {} steps", self.device.name(), self.steps_taken);
    }
}

impl<D: SimulatedDevice> Drop for CycleDrivenHarness<D> {
    fn drop(&mut self) {
        self.release();
    }
}
