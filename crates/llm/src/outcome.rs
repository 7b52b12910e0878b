use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Returned in place of a completion when no credential is configured.
pub const MISSING_API_KEY_MESSAGE: &str =
    "Error: API key is not set. Please add your API key to the .env file as OPENROUTER_API_KEY.";

/// Result of one completion call.
///
/// `Completed` carries the model's answer verbatim. Every other variant is a
/// failure that still renders to a fixed, human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum CompletionOutcome {
    Completed(String),
    MissingApiKey,
    /// The request never produced a response (DNS, refused, timeout, body read)
    Connection(String),
    HttpStatus { status: u16, detail: String },
    /// 2xx response whose body is not JSON
    NonJson(String),
    /// JSON body with an `error` member
    Api(String),
    /// JSON body without `choices[0].message.content`
    UnexpectedFormat(String),
}

impl CompletionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CompletionOutcome::Completed(_))
    }

    /// Short machine-friendly name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionOutcome::Completed(_) => "completed",
            CompletionOutcome::MissingApiKey => "missing_api_key",
            CompletionOutcome::Connection(_) => "connection",
            CompletionOutcome::HttpStatus { .. } => "http_status",
            CompletionOutcome::NonJson(_) => "non_json",
            CompletionOutcome::Api(_) => "api",
            CompletionOutcome::UnexpectedFormat(_) => "unexpected_format",
        }
    }

    /// The text shown to users: the answer, or the failure message.
    pub fn into_text(self) -> String {
        match self {
            CompletionOutcome::Completed(text) => text,
            other => other.to_string(),
        }
    }
}

impl fmt::Display for CompletionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionOutcome::Completed(text) => f.write_str(text),
            CompletionOutcome::MissingApiKey => f.write_str(MISSING_API_KEY_MESSAGE),
            CompletionOutcome::Connection(err) => write!(f, "Error connecting to API: {}", err),
            CompletionOutcome::HttpStatus { status, detail } => {
                write!(f, "API Error: HTTP {} - {}", status, detail)
            }
            CompletionOutcome::NonJson(body) => write!(f, "API Error: Non-JSON response - {}", body),
            CompletionOutcome::Api(err) => write!(f, "API Error: {}", err),
            CompletionOutcome::UnexpectedFormat(json) => {
                write!(f, "Unexpected API response format: {}", json)
            }
        }
    }
}

/// Strings print bare, everything else as compact JSON.
pub(crate) fn render_json(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
