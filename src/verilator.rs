//! Verilated devices, built at run time from `<rtl_dir>/<design>.sv`.

use eyre::Result;
use marlin::verilator::dynamic::{DynamicVerilatedModel, VerilatorValue};
use marlin::verilator::{
    AsDynamicVerilatedModel, PortDirection, VerilatedModelConfig, VerilatorRuntime,
    VerilatorRuntimeOptions,
};

use crate::config::HarnessConfig;
use crate::device::{Direction, Port, SignalValue, SimulatedDevice};
use crate::error::DeviceFault;
use crate::harness::RunReport;
use crate::testbench::{run_testbench, Testbench};

pub fn create_runtime(config: &HarnessConfig, bench: &Testbench) -> Result<VerilatorRuntime> {
    let source = config.rtl_source(bench.design);
    let src_files = [source.as_path()];
    let include_paths = [config.rtl_dir.as_path()];

    VerilatorRuntime::new(
        config.artifact_dir(),
        &src_files,
        &include_paths,
        [],
        VerilatorRuntimeOptions::default_logging(),
    )
    .map_err(|e| eyre::eyre!("Failed to create runtime for {}: {}", bench.design, e))
}

/// Build `bench.design` from RTL and run its script on the Verilated model.
pub fn run_verilated(bench: &Testbench, config: &HarnessConfig) -> Result<RunReport> {
    let runtime = create_runtime(config, bench)?;
    let device = VerilatedDevice::new(&runtime, bench, config)?;
    Ok(run_testbench(device, bench, config)?)
}

/// Marlin port tuple: name, msb, lsb, direction.
fn port_spec(port: &Port) -> (&'static str, usize, usize, PortDirection) {
    let direction = match port.direction {
        Direction::Input => PortDirection::Input,
        Direction::Output => PortDirection::Output,
    };
    (
        port.name,
        port.width.saturating_sub(1) as usize,
        0,
        direction,
    )
}

pub struct VerilatedDevice<'ctx> {
    name: String,
    ports: &'static [Port],
    model: DynamicVerilatedModel<'ctx>,
    inputs: Vec<SignalValue>,
}

impl<'ctx> VerilatedDevice<'ctx> {
    pub fn new(
        runtime: &'ctx VerilatorRuntime,
        bench: &Testbench,
        config: &HarnessConfig,
    ) -> Result<Self> {
        let source = config.rtl_source(bench.design);
        let ports: Vec<_> = bench.ports.iter().map(port_spec).collect();

        let model = runtime
            .create_dyn_model(
                bench.design,
                source.as_str(),
                &ports,
                VerilatedModelConfig::default(),
            )
            .map_err(|e| eyre::eyre!("Failed to create {} model: {:?}", bench.design, e))?;

        Ok(Self {
            name: bench.design.to_string(),
            ports: bench.ports,
            model,
            inputs: vec![0; bench.ports.len()],
        })
    }

    fn port(&self, signal: &str) -> Result<(usize, Port), DeviceFault> {
        self.ports
            .iter()
            .copied()
            .enumerate()
            .find(|(_, p)| p.name == signal)
            .ok_or_else(|| DeviceFault::UnknownSignal {
                device: self.name.clone(),
                signal: signal.to_string(),
            })
    }

    fn backend(&self, message: String) -> DeviceFault {
        DeviceFault::Backend {
            device: self.name.clone(),
            message,
        }
    }
}

fn value_of(value: VerilatorValue) -> Option<SignalValue> {
    match value {
        VerilatorValue::CData(v) => Some(v.into()),
        VerilatorValue::SData(v) => Some(v.into()),
        VerilatorValue::IData(v) => Some(v.into()),
        VerilatorValue::QData(v) => Some(v),
        _ => None,
    }
}

impl SimulatedDevice for VerilatedDevice<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn ports(&self) -> &[Port] {
        self.ports
    }

    fn set_input(&mut self, signal: &str, value: SignalValue) -> Result<(), DeviceFault> {
        let (idx, port) = self.port(signal)?;
        if port.direction != Direction::Input {
            return Err(DeviceFault::NotAnInput {
                device: self.name.clone(),
                signal: signal.to_string(),
            });
        }

        let value = port.truncate(value);
        let pinned = match port.width {
            0..=8 => self.model.pin(port.name, value as u8),
            9..=16 => self.model.pin(port.name, value as u16),
            17..=32 => self.model.pin(port.name, value as u32),
            _ => self.model.pin(port.name, value),
        };
        pinned.map_err(|e| self.backend(format!("pin {signal}: {e:?}")))?;
        self.inputs[idx] = value;
        Ok(())
    }

    fn input(&self, signal: &str) -> Result<SignalValue, DeviceFault> {
        let (idx, port) = self.port(signal)?;
        if port.direction != Direction::Input {
            return Err(DeviceFault::NotAnInput {
                device: self.name.clone(),
                signal: signal.to_string(),
            });
        }
        Ok(self.inputs[idx])
    }

    fn output(&self, signal: &str) -> Result<SignalValue, DeviceFault> {
        let (_, port) = self.port(signal)?;
        if port.direction != Direction::Output {
            return Err(DeviceFault::NotAnOutput {
                device: self.name.clone(),
                signal: signal.to_string(),
            });
        }
        let raw = self
            .model
            .read(port.name)
            .map_err(|e| self.backend(format!("read {signal}: {e:?}")))?;
        value_of(raw)
            .map(|v| port.truncate(v))
            .ok_or_else(|| self.backend(format!("{signal} is wider than 64 bits")))
    }

    fn eval(&mut self) -> Result<(), DeviceFault> {
        self.model.eval();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_spec_msb() {
        let (name, msb, lsb, direction) = port_spec(&Port::input("in_data", 8));
        assert_eq!((name, msb, lsb), ("in_data", 7, 0));
        assert!(matches!(direction, PortDirection::Input));

        let (_, msb, _, direction) = port_spec(&Port::output("led", 1));
        assert_eq!(msb, 0);
        assert!(matches!(direction, PortDirection::Output));
    }
}
