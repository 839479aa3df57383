//! Lifecycle telemetry
//!
//! Workflows emit a small set of events around their polling loops:
//! `orchestrator.wait.start`, `orchestrator.wait.stop`,
//! `orchestrator.wait.timeout` and `orchestrator.wait.fallback`. Emission is
//! fire-and-forget; a missing sink is a no-op and a sink must never block
//! the loop that feeds it.

use std::collections::HashMap;
use std::time::Duration;

/// An observability record: a namespaced name, numeric measurements and
/// string metadata. Never consulted for control flow.
#[derive(Debug, Clone)]
pub struct TelemetryEvent {
    /// Name segments, e.g. `["orchestrator", "wait", "start"]`.
    pub name: &'static [&'static str],

    pub measurements: HashMap<&'static str, f64>,

    pub metadata: HashMap<&'static str, String>,
}

impl TelemetryEvent {
    pub fn new(name: &'static [&'static str], operation: &str) -> Self {
        Self {
            name,
            measurements: HashMap::new(),
            metadata: [("operation", operation.to_string())].into_iter().collect(),
        }
    }

    pub fn with_duration(mut self, elapsed: Duration) -> Self {
        self.measurements
            .insert("duration_ms", elapsed.as_secs_f64() * 1000.0);
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.measurements.insert("attempts", f64::from(attempts));
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.metadata.insert("reason", reason.into());
        self
    }

    /// Dotted form of the name, e.g. `orchestrator.wait.timeout`.
    pub fn full_name(&self) -> String {
        self.name.join(".")
    }
}

/// Receiver for lifecycle events.
pub trait TelemetrySink: Send + Sync {
    fn emit(&self, event: TelemetryEvent);
}

/// Sink that forwards every event to `tracing` at debug level.
#[derive(Debug, Default)]
pub struct LogSink;

impl TelemetrySink for LogSink {
    fn emit(&self, event: TelemetryEvent) {
        tracing::debug!(
            target: "skylift::telemetry",
            event = %event.full_name(),
            measurements = ?event.measurements,
            metadata = ?event.metadata,
        );
    }
}
