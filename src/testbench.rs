use log::debug;

use crate::config::HarnessConfig;
use crate::device::{Port, SimulatedDevice};
use crate::error::{HarnessError, HarnessResult};
use crate::harness::{Clocking, CycleDrivenHarness, Reset, RunReport};
use crate::script::Script;
use crate::trace::VcdWriter;

/// Everything needed to exercise one design: its ports, how it is clocked
/// and reset, and the script to run.
#[derive(Debug, Clone)]
pub struct Testbench {
    /// Top module name, also the RTL file stem.
    pub design: &'static str,
    pub ports: &'static [Port],
    pub clocking: Clocking,
    pub reset: Reset,
    pub script: Script,
    pub trace_file: Option<&'static str>,
}

/// Run `bench` against `device`. The device is finalized on every path.
pub fn run_testbench<D: SimulatedDevice>(
    device: D,
    bench: &Testbench,
    config: &HarnessConfig,
) -> HarnessResult<RunReport> {
    let mut harness = CycleDrivenHarness::new(device, bench.clocking);

    if let Some(file) = bench.trace_file.filter(|_| config.enable_tracing) {
        let path = config.trace_path(file);
        debug!("{}: waveform trace at {}", bench.design, path);
        harness = harness.with_trace(Box::new(VcdWriter::new()), &path, config.trace_half_period);
    }

    let result = harness
        .initialize(&bench.reset)
        .map_err(HarnessError::from)
        .and_then(|()| harness.run(&bench.script));

    harness.finalize();
    result
}
