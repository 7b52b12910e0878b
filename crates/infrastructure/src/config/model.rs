use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "meta-llama/llama-3.3-8b-instruct:free";
pub const DEFAULT_REFERER: &str = "https://moengage-doc-improver.streamlit.app";
pub const DEFAULT_APP_TITLE: &str = "MoEngage Doc Improver";
pub const DEFAULT_EXCERPT_CHARS: usize = 2000;

/// Full application configuration.
///
/// Every section has serde defaults, so a config file only needs the keys it
/// wants to change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Credential for the text-generation endpoint. Absent is allowed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_referer")]
    pub referer: String,

    #[serde(default = "default_app_title")]
    pub app_title: String,

    /// No timeout unless configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_endpoint(),
            model: default_model(),
            referer: default_referer(),
            app_title: default_app_title(),
            timeout_secs: None,
        }
    }
}

impl LlmConfig {
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Key with everything after the first five characters hidden.
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .map(|k| format!("{}...", k.chars().take(5).collect::<String>()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
        }
    }
}

impl StorageConfig {
    pub fn sqlite_path(&self) -> PathBuf {
        self.base_path.join("sessions.db")
    }

    pub fn content_path(&self) -> PathBuf {
        self.base_path.join("content")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Characters of content embedded in each critique prompt
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,

    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,

    #[serde(default)]
    pub concurrent_critiques: bool,

    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            excerpt_chars: default_excerpt_chars(),
            recent_limit: default_recent_limit(),
            concurrent_critiques: false,
            preview_chars: default_preview_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_referer() -> String {
    DEFAULT_REFERER.to_string()
}

fn default_app_title() -> String {
    DEFAULT_APP_TITLE.to_string()
}

fn default_base_path() -> PathBuf {
    PathBuf::from(".data")
}

fn default_user_agent() -> String {
    format!("docimprove/{}", env!("CARGO_PKG_VERSION"))
}

fn default_excerpt_chars() -> usize {
    DEFAULT_EXCERPT_CHARS
}

fn default_recent_limit() -> usize {
    5
}

fn default_preview_chars() -> usize {
    1500
}

fn default_log_level() -> String {
    "warn".to_string()
}
