use camino::{Utf8Path, Utf8PathBuf};

/// Where RTL lives, where Verilator builds go, and how traces are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub artifact_dir: Utf8PathBuf,
    pub rtl_dir: Utf8PathBuf,
    pub trace_dir: Utf8PathBuf,
    /// Timestamp increment per recorded clock phase. The first recorded
    /// phase is at time 0.
    pub trace_half_period: u64,
    pub enable_tracing: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            artifact_dir: Utf8PathBuf::from("artifacts"),
            rtl_dir: Utf8PathBuf::from("rtl"),
            trace_dir: Utf8PathBuf::from("."),
            trace_half_period: 10,
            enable_tracing: true,
        }
    }
}

impl HarnessConfig {
    pub fn with_artifact_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.artifact_dir = dir.into();
        self
    }

    pub fn with_rtl_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.rtl_dir = dir.into();
        self
    }

    pub fn with_trace_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.trace_dir = dir.into();
        self
    }

    pub fn with_tracing(mut self, enable: bool) -> Self {
        self.enable_tracing = enable;
        self
    }

    pub fn with_trace_half_period(mut self, half_period: u64) -> Self {
        self.trace_half_period = half_period;
        self
    }

    /// `<rtl_dir>/<design>.sv`
    pub fn rtl_source(&self, design: &str) -> Utf8PathBuf {
        self.rtl_dir.join(format!("{design}.sv"))
    }

    pub fn trace_path(&self, file_name: &str) -> Utf8PathBuf {
        self.trace_dir.join(file_name)
    }

    pub fn artifact_dir(&self) -> &Utf8Path {
        &self.artifact_dir
    }
}
