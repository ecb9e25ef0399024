//! Waveform tracing. Purely observational: a failing trace is logged and
//! dropped, the run carries on.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use camino::Utf8Path;
use log::{debug, warn};

use crate::device::{Port, SignalValue, SimulatedDevice};

pub trait TraceSink {
    fn open(&mut self, path: &Utf8Path, scope: &str, ports: &[Port]) -> io::Result<()>;
    fn dump(&mut self, timestamp: u64, values: &[SignalValue]) -> io::Result<()>;
    fn close(&mut self) -> io::Result<()>;
}

/// Minimal VCD writer: one module scope, one wire per port, value changes
/// only.
#[derive(Debug, Default)]
pub struct VcdWriter {
    writer: Option<BufWriter<File>>,
    vars: Vec<(String, u32)>,
    last_values: Vec<Option<SignalValue>>,
    timestamp: Option<u64>,
}

impl VcdWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn generate_vcd_id(num: usize) -> String {
        let mut id = String::new();
        let mut n = num;
        loop {
            id.push(((n % 94) + 33) as u8 as char);
            if n < 94 {
                break;
            }
            n = (n / 94) - 1;
        }
        id.chars().rev().collect()
    }

    fn writer(&mut self) -> io::Result<&mut BufWriter<File>> {
        self.writer
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "VCD trace is not open"))
    }
}

impl TraceSink for VcdWriter {
    fn open(&mut self, path: &Utf8Path, scope: &str, ports: &[Port]) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);

        writeln!(writer, "$version")?;
        writeln!(writer, "  {} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))?;
        writeln!(writer, "$end")?;
        writeln!(writer, "$timescale 1ns $end")?;
        writeln!(writer, "$scope module {} $end", scope)?;

        self.vars.clear();
        for (i, port) in ports.iter().enumerate() {
            let id = Self::generate_vcd_id(i);
            writeln!(writer, "$var wire {} {} {} $end", port.width, id, port.name)?;
            self.vars.push((id, port.width));
        }

        writeln!(writer, "$upscope $end")?;
        writeln!(writer, "$enddefinitions $end")?;

        self.last_values = vec![None; ports.len()];
        self.timestamp = None;
        self.writer = Some(writer);
        Ok(())
    }

    fn dump(&mut self, timestamp: u64, values: &[SignalValue]) -> io::Result<()> {
        let new_time = self.timestamp.map_or(true, |t| timestamp > t);
        let mut lines = Vec::new();
        if new_time {
            lines.push(format!("#{timestamp}"));
            self.timestamp = Some(timestamp);
        }

        for (i, value) in values.iter().enumerate().take(self.vars.len()) {
            if self.last_values[i] == Some(*value) {
                continue;
            }
            let (id, width) = &self.vars[i];
            if *width == 1 {
                lines.push(format!("{value}{id}"));
            } else {
                lines.push(format!("b{value:b} {id}"));
            }
            self.last_values[i] = Some(*value);
        }

        let writer = self.writer()?;
        for line in lines {
            writeln!(writer, "{line}")?;
        }
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        match self.writer.take() {
            Some(mut writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

/// An open trace plus its clock: each recorded phase advances the timestamp
/// by one half-period.
pub struct TraceSession {
    sink: Box<dyn TraceSink>,
    half_period: u64,
    timestamp: u64,
    active: bool,
}

impl TraceSession {
    /// Opens the sink. Returns `None`, after logging, if that fails.
    pub fn open(
        mut sink: Box<dyn TraceSink>,
        path: &Utf8Path,
        device: &dyn SimulatedDevice,
        half_period: u64,
    ) -> Option<Self> {
        match sink.open(path, device.name(), device.ports()) {
            Ok(()) => {
                debug!("tracing {} to {}", device.name(), path);
                Some(Self {
                    sink,
                    half_period,
                    timestamp: 0,
                    active: true,
                })
            }
            Err(e) => {
                warn!("could not open trace {}: {}", path, e);
                None
            }
        }
    }

    pub fn record(&mut self, device: &dyn SimulatedDevice) {
        if !self.active {
            return;
        }
        let result = device
            .snapshot()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
            .and_then(|values| self.sink.dump(self.timestamp, &values));
        if let Err(e) = result {
            warn!("trace dump at {} failed, tracing stopped: {}", self.timestamp, e);
            self.active = false;
        }
        self.timestamp += self.half_period;
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn close(&mut self) {
        if let Err(e) = self.sink.close() {
            warn!("closing trace failed: {}", e);
        }
        self.active = false;
    }
}
