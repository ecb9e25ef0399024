//! Error types shared by devices and the harness.

use thiserror::Error;

use crate::device::SignalValue;

/// A fault reported by the simulated device itself. Always fatal to a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceFault {
    #[error("{device}: no signal named `{signal}`")]
    UnknownSignal { device: String, signal: String },

    #[error("{device}: `{signal}` is an output and cannot be driven")]
    NotAnInput { device: String, signal: String },

    #[error("{device}: `{signal}` is an input, not an output")]
    NotAnOutput { device: String, signal: String },

    #[error("{device}: {message}")]
    Backend { device: String, message: String },
}

/// An output that did not match what the script expected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{label} failed at step {step}: {signal} = {observed:#x} ({observed:#010b}), expected {expected:#x} ({expected:#010b})")]
pub struct Mismatch {
    pub step: usize,
    pub label: String,
    pub signal: &'static str,
    pub expected: SignalValue,
    pub observed: SignalValue,
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Mismatch(Mismatch),

    #[error(transparent)]
    Device(#[from] DeviceFault),
}

impl HarnessError {
    pub fn mismatch(&self) -> Option<&Mismatch> {
        match self {
            HarnessError::Mismatch(m) => Some(m),
            HarnessError::Device(_) => None,
        }
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;
