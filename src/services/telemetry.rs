use std::collections::HashMap;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::AppError;

/// Fire-and-forget event sink for dialog telemetry.
pub trait TelemetrySink: Send + Sync {
    fn track_event(&self, name: &str, properties: &HashMap<String, String>);
}

pub struct NullTelemetry;

impl TelemetrySink for NullTelemetry {
    fn track_event(&self, _name: &str, _properties: &HashMap<String, String>) {}
}

/// Emits every event as a structured `tracing` record.
pub struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn track_event(&self, name: &str, properties: &HashMap<String, String>) {
        tracing::info!(event = name, properties = ?properties, "custom event");
    }
}

pub fn from_config(config: &AppConfig) -> Result<Arc<dyn TelemetrySink>, AppError> {
    match config.telemetry_sink.as_str() {
        "log" => Ok(Arc::new(TracingTelemetry)),
        "none" => Ok(Arc::new(NullTelemetry)),
        other => Err(AppError::Config(format!(
            "unknown TELEMETRY_SINK '{other}', expected 'log' or 'none'"
        ))),
    }
}
