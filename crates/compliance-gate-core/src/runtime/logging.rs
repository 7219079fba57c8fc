// crates/compliance-gate-core/src/runtime/logging.rs
// ============================================================================
// Module: Compliance Gate Log Sinks
// Description: Tracing, JSON-line (stderr and file), and no-op log sinks.
// Purpose: Route runtime log records without hard-wiring a logging pipeline.
// Dependencies: crate::interfaces, serde_json, tracing
// ============================================================================

//! ## Overview
//! [`TracingLogSink`] is the default and forwards records to `tracing` with
//! structured fields. [`StderrLogSink`] and [`FileLogSink`] write one JSON
//! object per line for hosts without a subscriber. Records never carry key
//! material.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use crate::interfaces::LogLevel;
use crate::interfaces::LogRecord;
use crate::interfaces::LogSink;

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Log sink that forwards records to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn record(&self, record: &LogRecord) {
        let execution_id = record.execution_id.as_deref().unwrap_or("");
        let gate_id = record.gate_id.as_deref().unwrap_or("");
        let fields = record.fields.to_string();
        match record.level {
            LogLevel::Debug => tracing::debug!(
                log_event = record.event,
                execution_id,
                gate_id,
                fields = %fields,
                "{}",
                record.message
            ),
            LogLevel::Info => tracing::info!(
                log_event = record.event,
                execution_id,
                gate_id,
                fields = %fields,
                "{}",
                record.message
            ),
            LogLevel::Warn => tracing::warn!(
                log_event = record.event,
                execution_id,
                gate_id,
                fields = %fields,
                "{}",
                record.message
            ),
            LogLevel::Error => tracing::error!(
                log_event = record.event,
                execution_id,
                gate_id,
                fields = %fields,
                "{}",
                record.message
            ),
        }
    }
}

/// Log sink that writes JSON lines to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrLogSink;

impl LogSink for StderrLogSink {
    fn record(&self, record: &LogRecord) {
        write_json_line(&mut io::stderr(), record);
    }
}

/// Log sink that appends JSON lines to a file.
#[derive(Debug)]
pub struct FileLogSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileLogSink {
    /// Opens the log file in append mode, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl LogSink for FileLogSink {
    fn record(&self, record: &LogRecord) {
        if let Ok(mut file) = self.file.lock() {
            write_json_line(&mut *file, record);
            let _ = file.flush();
        }
    }
}

/// Writes a record as a single JSON line, dropping it if serialization fails.
fn write_json_line(writer: &mut dyn Write, record: &LogRecord) {
    if let Ok(payload) = serde_json::to_string(record) {
        let _ = writeln!(writer, "{payload}");
    }
}

/// Log sink that discards records.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogSink;

impl LogSink for NoopLogSink {
    fn record(&self, _record: &LogRecord) {}
}
