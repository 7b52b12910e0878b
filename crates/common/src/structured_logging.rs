use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::io::{self, Write};
use std::str::FromStr;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

/// One log line in JSON mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredLogEntry {
    /// ISO 8601 timestamp
    pub timestamp: String,
    pub level: String,
    /// Module path of the event
    pub target: String,
    pub message: String,
    /// Any extra structured fields attached to the event
    #[serde(flatten)]
    pub fields: HashMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ExecutionContext>,
}

/// Process-level context attached to every JSON entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub app_version: String,
    pub pid: u32,
    pub thread_id: String,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            pid: std::process::id(),
            thread_id: format!("{:?}", std::thread::current().id()),
        }
    }
}

/// Layer that renders every event as a single JSON line on stderr.
///
/// Stdout is reserved for reports so that `docimprove show <id> --format json`
/// stays pipeable while logging is on.
pub struct JsonFormatter {
    include_context: bool,
}

impl<S> Layer<S> for JsonFormatter
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);

        let entry = StructuredLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            level: event.metadata().level().to_string(),
            target: event.metadata().target().to_string(),
            message: visitor.message.unwrap_or_default(),
            fields: visitor.fields,
            context: self.include_context.then(ExecutionContext::default),
        };

        if let Ok(json) = serde_json::to_string(&entry) {
            let _ = writeln!(io::stderr(), "{}", json);
        }
    }
}

/// Collects event fields; `message` is split out, everything else kept as JSON.
#[derive(Default)]
struct JsonVisitor {
    message: Option<String>,
    fields: HashMap<String, Value>,
}

impl JsonVisitor {
    fn put(&mut self, field: &Field, value: Value) {
        match (field.name(), value) {
            ("message", Value::String(text)) => self.message = Some(text),
            (name, value) => {
                self.fields.insert(name.to_string(), value);
            }
        }
    }
}

impl Visit for JsonVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put(field, Value::String(format!("{:?}", value)));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // NaN and infinities have no JSON form
        if let Some(n) = serde_json::Number::from_f64(value) {
            self.put(field, Value::Number(n));
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, Value::Bool(value));
    }
}

/// Logging settings resolved from the application config and CLI flags.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level, used when `RUST_LOG` is not set
    pub level: Level,
    pub json_output: bool,
    /// Only applies to the human-readable format
    pub color_output: bool,
    pub include_context: bool,
    pub include_line_numbers: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            json_output: false,
            color_output: true,
            include_context: true,
            include_line_numbers: cfg!(debug_assertions),
        }
    }
}

impl LoggingConfig {
    /// Build from the textual level used in config files ("info", "debug", ...).
    pub fn from_level_name(level: &str, json_output: bool) -> anyhow::Result<Self> {
        let level = Level::from_str(level)
            .map_err(|_| anyhow::anyhow!("Unknown log level: {}", level))?;
        Ok(Self {
            level,
            json_output,
            ..Self::default()
        })
    }
}

/// Install the global tracing subscriber. Call once, at startup.
///
/// `RUST_LOG` wins over the configured level when it is set.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    let installed = if config.json_output {
        let json = JsonFormatter {
            include_context: config.include_context,
        };
        tracing::subscriber::set_global_default(Registry::default().with(filter).with(json))
    } else {
        let human = fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .with_line_number(config.include_line_numbers)
            .with_ansi(config.color_output);
        tracing::subscriber::set_global_default(Registry::default().with(filter).with(human))
    };

    installed.map_err(|e| anyhow::anyhow!("Logging already initialized: {}", e))
}

/// Measures an operation and logs its duration when finished.
pub struct OperationTimer {
    name: String,
    started: Instant,
    fields: HashMap<String, Value>,
}

impl OperationTimer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started: Instant::now(),
            fields: HashMap::new(),
        }
    }

    /// Attach a field to the completion record. Values that fail to
    /// serialize are dropped.
    pub fn add_field(&mut self, key: impl Into<String>, value: impl Serialize) {
        if let Ok(value) = serde_json::to_value(value) {
            self.fields.insert(key.into(), value);
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    pub fn finish(self) {
        let elapsed = self.elapsed_ms();
        tracing::info!(
            operation = %self.name,
            duration_ms = elapsed,
            fields = ?self.fields,
            "{} finished", self.name
        );
    }

    pub fn finish_with_error(self, error: &str) {
        let elapsed = self.elapsed_ms();
        tracing::error!(
            operation = %self.name,
            duration_ms = elapsed,
            error = %error,
            fields = ?self.fields,
            "{} failed", self.name
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_from_level_name() {
        let config = LoggingConfig::from_level_name("debug", true).expect("valid level");
        assert_eq!(config.level, Level::DEBUG);
        assert!(config.json_output);

        assert!(LoggingConfig::from_level_name("chatty", false).is_err());
    }

    #[test]
    fn test_structured_entry_flattens_fields() {
        let mut fields = HashMap::new();
        fields.insert("session_id".to_string(), Value::String("abc".to_string()));

        let entry = StructuredLogEntry {
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            level: "INFO".to_string(),
            target: "analyzer".to_string(),
            message: "saved".to_string(),
            fields,
            context: None,
        };

        let json = serde_json::to_value(&entry).expect("serializable");
        assert_eq!(json["session_id"], "abc");
        assert!(json.get("context").is_none());
    }

    #[test]
    fn test_operation_timer_collects_fields() {
        let mut timer = OperationTimer::new("analyze");
        timer.add_field("category", "style");
        assert_eq!(timer.fields.get("category"), Some(&Value::from("style")));
        timer.finish();
    }
}
