//! Logging capability handed to the probe pipeline.
//!
//! The pipeline never reaches for a global logger. It receives a
//! [`ProbeLogger`] at construction time, which in the binary forwards to
//! `tracing` and in tests records every line for later inspection.

use std::fmt;
use std::sync::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// Write-only sink for human readable progress and failure lines.
pub trait ProbeLogger: Send + Sync {
    fn log(&self, severity: Severity, message: &str);

    fn debug(&self, message: &str) {
        self.log(Severity::Debug, message);
    }

    fn info(&self, message: &str) {
        self.log(Severity::Info, message);
    }

    fn warning(&self, message: &str) {
        self.log(Severity::Warning, message);
    }

    fn critical(&self, message: &str) {
        self.log(Severity::Critical, message);
    }
}

/// Forwards every line to the `tracing` macros. `Critical` maps to `ERROR`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl ProbeLogger for TracingLogger {
    fn log(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Debug => tracing::debug!(target: "netprobe", "{message}"),
            Severity::Info => tracing::info!(target: "netprobe", "{message}"),
            Severity::Warning => tracing::warn!(target: "netprobe", "{message}"),
            Severity::Critical => tracing::error!(target: "netprobe", "{message}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogLine {
    pub severity: Severity,
    pub message: String,
}

/// Keeps every line in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    lines: Mutex<Vec<LogLine>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<LogLine> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn messages_at(&self, severity: Severity) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.severity == severity)
            .map(|line| line.message)
            .collect()
    }
}

impl ProbeLogger for RecordingLogger {
    fn log(&self, severity: Severity, message: &str) {
        let line = LogLine {
            severity,
            message: message.to_string(),
        };
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line),
            Err(poisoned) => poisoned.into_inner().push(line),
        }
    }
}
