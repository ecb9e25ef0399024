use eyre::Result;
use hdl_harness::{designs, run_all, HarnessConfig};

#[cfg(feature = "verilator")]
use hdl_harness::verilator::run_verilated as run_design;

fn main() -> Result<()> {
    env_logger::init();
    println!("🚀 HDL harness starting...");

    let config = HarnessConfig::default();
    run_all(&config, &designs::all(), run_design)?;

    println!("🎉 All tests passed!");
    Ok(())
}

#[cfg(not(feature = "verilator"))]
fn run_design(bench: &hdl_harness::Testbench, _: &HarnessConfig) -> Result<hdl_harness::RunReport> {
    Err(eyre::eyre!(
        "cannot run {}: built without the `verilator` feature, so there is no HDL model to drive",
        bench.design
    ))
}
