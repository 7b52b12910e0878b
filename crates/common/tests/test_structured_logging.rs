use common::{init_logging, ExecutionContext, LoggingConfig, OperationTimer, StructuredLogEntry};
use serde_json::Value;
use std::collections::HashMap;

#[test]
fn test_structured_log_entry_roundtrip_through_json() {
    let mut fields = HashMap::new();
    fields.insert("url".to_string(), Value::String("https://example.com".to_string()));

    let entry = StructuredLogEntry {
        timestamp: chrono::Utc::now().to_rfc3339(),
        level: "INFO".to_string(),
        target: "extractor".to_string(),
        message: "Fetched page".to_string(),
        fields,
        context: Some(ExecutionContext::default()),
    };

    let json = serde_json::to_string(&entry).expect("serialize entry");
    let parsed: StructuredLogEntry = serde_json::from_str(&json).expect("parse entry");

    assert_eq!(parsed.message, "Fetched page");
    assert_eq!(parsed.target, "extractor");
    assert_eq!(
        parsed.fields.get("url"),
        Some(&Value::String("https://example.com".to_string()))
    );
    assert_eq!(parsed.context.map(|c| c.pid), Some(std::process::id()));
}

#[test]
fn test_init_logging_installs_once() {
    let config = LoggingConfig {
        json_output: true,
        ..LoggingConfig::default()
    };

    init_logging(&config).expect("first init succeeds");
    // Second global install must be rejected rather than silently replacing it
    assert!(init_logging(&config).is_err());

    let mut timer = OperationTimer::new("logging_smoke");
    timer.add_field("items", 3);
    timer.finish();
}
