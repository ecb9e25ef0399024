//! The capability a simulated device under test exposes to the harness.
//!
//! A device is a set of named, integer valued ports plus an `eval` call that
//! recomputes outputs from the current inputs. How the device was built
//! (Verilated from RTL, or a fake in a test) is invisible here.

use crate::error::DeviceFault;

pub type SignalValue = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// A port declaration: name, bit width and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Port {
    pub name: &'static str,
    pub width: u32,
    pub direction: Direction,
}

impl Port {
    /// Panics on a zero width; in a `static` that is a compile error.
    pub const fn input(name: &'static str, width: u32) -> Self {
        assert!(width > 0, "port width must be at least one bit");
        Self {
            name,
            width,
            direction: Direction::Input,
        }
    }

    pub const fn output(name: &'static str, width: u32) -> Self {
        assert!(width > 0, "port width must be at least one bit");
        Self {
            name,
            width,
            direction: Direction::Output,
        }
    }

    pub fn mask(&self) -> SignalValue {
        if self.width >= SignalValue::BITS {
            SignalValue::MAX
        } else {
            (1 << self.width) - 1
        }
    }

    /// Two's-complement wraparound into the port's width.
    pub fn truncate(&self, value: SignalValue) -> SignalValue {
        value & self.mask()
    }
}

pub trait SimulatedDevice {
    fn name(&self) -> &str;

    fn ports(&self) -> &[Port];

    /// Drive an input. The value is truncated to the port width.
    fn set_input(&mut self, signal: &str, value: SignalValue) -> Result<(), DeviceFault>;

    /// Current value of an input, as last driven.
    fn input(&self, signal: &str) -> Result<SignalValue, DeviceFault>;

    /// Value of an output as of the last `eval`.
    fn output(&self, signal: &str) -> Result<SignalValue, DeviceFault>;

    /// Recompute outputs from the current inputs. Does not advance time.
    fn eval(&mut self) -> Result<(), DeviceFault>;

    /// Release simulator-side resources. Called exactly once by the harness.
    fn finalize(&mut self) {}

    /// Read any port regardless of direction.
    fn read(&self, signal: &str) -> Result<SignalValue, DeviceFault> {
        match self.ports().iter().find(|p| p.name == signal) {
            Some(port) if port.direction == Direction::Input => self.input(signal),
            Some(_) => self.output(signal),
            None => Err(DeviceFault::UnknownSignal {
                device: self.name().to_string(),
                signal: signal.to_string(),
            }),
        }
    }

    /// All port values in declaration order.
    fn snapshot(&self) -> Result<Vec<SignalValue>, DeviceFault> {
        self.ports().iter().map(|p| self.read(p.name)).collect()
    }
}

impl<T: SimulatedDevice + ?Sized> SimulatedDevice for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn ports(&self) -> &[Port] {
        (**self).ports()
    }

    fn set_input(&mut self, signal: &str, value: SignalValue) -> Result<(), DeviceFault> {
        (**self).set_input(signal, value)
    }

    fn input(&self, signal: &str) -> Result<SignalValue, DeviceFault> {
        (**self).input(signal)
    }

    fn output(&self, signal: &str) -> Result<SignalValue, DeviceFault> {
        (**self).output(signal)
    }

    fn eval(&mut self) -> Result<(), DeviceFault> {
        (**self).eval()
    }

    fn finalize(&mut self) {
        (**self).finalize()
    }
}

/// Read-only view of a device's live inputs, handed to expectation formulas.
pub struct Inputs<'a> {
    device: &'a dyn SimulatedDevice,
}

impl<'a> Inputs<'a> {
    pub fn new(device: &'a dyn SimulatedDevice) -> Self {
        Self { device }
    }

    pub fn get(&self, signal: &str) -> Result<SignalValue, DeviceFault> {
        self.device.input(signal)
    }
}

/// Backing store for devices implemented in software: one masked value per
/// declared port.
#[derive(Debug, Clone)]
pub struct PortMap {
    device: String,
    ports: &'static [Port],
    values: Vec<SignalValue>,
}

impl PortMap {
    pub fn new(device: impl Into<String>, ports: &'static [Port]) -> Self {
        Self {
            device: device.into(),
            ports,
            values: vec![0; ports.len()],
        }
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn ports(&self) -> &'static [Port] {
        self.ports
    }

    fn index(&self, signal: &str) -> Result<usize, DeviceFault> {
        self.ports
            .iter()
            .position(|p| p.name == signal)
            .ok_or_else(|| DeviceFault::UnknownSignal {
                device: self.device.clone(),
                signal: signal.to_string(),
            })
    }

    fn index_with(&self, signal: &str, direction: Direction) -> Result<usize, DeviceFault> {
        let idx = self.index(signal)?;
        if self.ports[idx].direction == direction {
            return Ok(idx);
        }
        let (device, signal) = (self.device.clone(), signal.to_string());
        Err(match direction {
            Direction::Input => DeviceFault::NotAnInput { device, signal },
            Direction::Output => DeviceFault::NotAnOutput { device, signal },
        })
    }

    /// Harness-side write. Only inputs may be driven.
    pub fn drive(&mut self, signal: &str, value: SignalValue) -> Result<(), DeviceFault> {
        let idx = self.index_with(signal, Direction::Input)?;
        self.values[idx] = self.ports[idx].truncate(value);
        Ok(())
    }

    /// Device-side write of an output.
    pub fn publish(&mut self, signal: &str, value: SignalValue) -> Result<(), DeviceFault> {
        let idx = self.index_with(signal, Direction::Output)?;
        self.values[idx] = self.ports[idx].truncate(value);
        Ok(())
    }

    pub fn input(&self, signal: &str) -> Result<SignalValue, DeviceFault> {
        Ok(self.values[self.index_with(signal, Direction::Input)?])
    }

    pub fn output(&self, signal: &str) -> Result<SignalValue, DeviceFault> {
        Ok(self.values[self.index_with(signal, Direction::Output)?])
    }

    pub fn values(&self) -> &[SignalValue] {
        &self.values
    }
}
