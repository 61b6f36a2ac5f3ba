//! Log sinks
//!
//! A sink receives the finished entry and owns serialization and storage.
//! Its level filter is consulted before any capture work, so a disabled
//! level costs nothing beyond the check itself.

use crate::policy::{LogEntry, LogLevel};
use crate::transport::BoxError;
use serde_json::{Map, Value};
use std::sync::Mutex;

/// Destination for finished log entries.
pub trait LogSink: Send + Sync {
    /// Whether entries at this level would be emitted.
    ///
    /// Consulted before bodies and headers are captured; returning false
    /// skips that work entirely.
    fn is_enabled(&self, level: LogLevel) -> bool;

    /// Emit one entry.
    fn write(&self, level: LogLevel, error: Option<&BoxError>, entry: &LogEntry);
}

/// Default sink: one `tracing` event per entry under the `reqtap` target.
///
/// The rendered message becomes the event message; the named properties ride
/// along serialized as a single JSON field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    /// Create the sink.
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for TracingSink {
    fn is_enabled(&self, level: LogLevel) -> bool {
        match level {
            LogLevel::Trace => tracing::enabled!(target: "reqtap", tracing::Level::TRACE),
            LogLevel::Debug => tracing::enabled!(target: "reqtap", tracing::Level::DEBUG),
            LogLevel::Info => tracing::enabled!(target: "reqtap", tracing::Level::INFO),
            LogLevel::Warn => tracing::enabled!(target: "reqtap", tracing::Level::WARN),
            LogLevel::Error => tracing::enabled!(target: "reqtap", tracing::Level::ERROR),
        }
    }

    fn write(&self, level: LogLevel, error: Option<&BoxError>, entry: &LogEntry) {
        let message = entry.render_message();
        let properties: Map<String, Value> = entry.properties.iter().cloned().collect();
        let properties =
            serde_json::to_string(&Value::Object(properties)).unwrap_or_else(|_| "{}".to_string());
        let error = error.map(ToString::to_string).unwrap_or_default();
        match level {
            LogLevel::Trace => {
                tracing::trace!(target: "reqtap", properties = %properties, error = %error, "{message}")
            }
            LogLevel::Debug => {
                tracing::debug!(target: "reqtap", properties = %properties, error = %error, "{message}")
            }
            LogLevel::Info => {
                tracing::info!(target: "reqtap", properties = %properties, error = %error, "{message}")
            }
            LogLevel::Warn => {
                tracing::warn!(target: "reqtap", properties = %properties, error = %error, "{message}")
            }
            LogLevel::Error => {
                tracing::error!(target: "reqtap", properties = %properties, error = %error, "{message}")
            }
        }
    }
}

/// One entry recorded by a [`MemorySink`].
#[derive(Debug, Clone)]
pub struct RecordedEntry {
    /// Severity the entry was written at.
    pub level: LogLevel,
    /// The rendered message.
    pub message: String,
    /// The raw message template.
    pub message_template: String,
    /// The entry's named properties.
    pub properties: Vec<(String, Value)>,
    /// Display form of the transport error, when one occurred.
    pub error: Option<String>,
}

impl RecordedEntry {
    /// Look up a named property.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

/// In-memory recording sink for tests and tooling.
#[derive(Debug, Default)]
pub struct MemorySink {
    min_level: Option<LogLevel>,
    entries: Mutex<Vec<RecordedEntry>>,
}

impl MemorySink {
    /// Record every level.
    pub fn new() -> Self {
        Self {
            min_level: Some(LogLevel::Trace),
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Record entries at or above the given level.
    pub fn with_min_level(level: LogLevel) -> Self {
        Self {
            min_level: Some(level),
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Report every level as disabled.
    pub fn disabled() -> Self {
        Self {
            min_level: None,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// The entries recorded so far.
    pub fn entries(&self) -> Vec<RecordedEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Drop all recorded entries.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl LogSink for MemorySink {
    fn is_enabled(&self, level: LogLevel) -> bool {
        self.min_level.is_some_and(|min| level >= min)
    }

    fn write(&self, level: LogLevel, error: Option<&BoxError>, entry: &LogEntry) {
        if !self.is_enabled(level) {
            return;
        }
        let recorded = RecordedEntry {
            level,
            message: entry.render_message(),
            message_template: entry.message_template.clone(),
            properties: entry.properties.clone(),
            error: error.map(ToString::to_string),
        };
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(recorded);
        }
    }
}
