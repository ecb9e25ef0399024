//! Runs testbenches in order, stopping at the first one that fails.

use eyre::Result;
use log::error;

use crate::config::HarnessConfig;
use crate::harness::RunReport;
use crate::testbench::Testbench;

/// Run every bench through `run_one`, printing observations and a summary
/// line per design. The first error is returned as is, so a mismatch keeps
/// its step, label and values in the message.
pub fn run_all<F>(config: &HarnessConfig, benches: &[Testbench], mut run_one: F) -> Result<Vec<RunReport>>
where
    F: FnMut(&Testbench, &HarnessConfig) -> Result<RunReport>,
{
    let mut reports = Vec::with_capacity(benches.len());

    for bench in benches {
        println!("🔄 {}: {}", bench.design, bench.script.name());
        let report = match run_one(bench, config) {
            Ok(report) => report,
            Err(e) => {
                error!("{}: {}", bench.design, e);
                println!("❌ {}: {}", bench.design, e);
                return Err(e);
            }
        };

        for obs in &report.observations {
            println!("   step {:>2}: {} = {:#010b}", obs.at, obs.signal, obs.value);
        }
        println!(
            "✅ {}: {} checks passed in {} steps",
            bench.design, report.checks_passed, report.steps_run
        );
        reports.push(report);
    }

    Ok(reports)
}
