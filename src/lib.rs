pub mod config;
pub mod designs;
pub mod device;
pub mod error;
pub mod harness;
pub mod runner;
pub mod script;
pub mod testbench;
pub mod trace;
#[cfg(feature = "verilator")]
pub mod verilator;

pub use config::HarnessConfig;
pub use device::{Direction, Inputs, Port, PortMap, SignalValue, SimulatedDevice};
pub use error::{DeviceFault, HarnessError, HarnessResult, Mismatch};
pub use harness::{
    Clocking, CycleDrivenHarness, Edge, Observation, Outcome, Phase, Reset, ResetPhase, RunReport,
};
pub use runner::run_all;
pub use script::{Expectation, Expected, Script, Stepping, Stimulus, Watch};
pub use testbench::{run_testbench, Testbench};
pub use trace::{TraceSession, TraceSink, VcdWriter};
