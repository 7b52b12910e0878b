use super::model::{AnalysisConfig, AppConfig, LlmConfig, LoggingSettings};
use anyhow::{bail, Result};
use tracing::warn;

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, config: &AppConfig) -> Result<()> {
        self.validate_llm_config(&config.llm)?;
        self.validate_analysis_config(&config.analysis)?;
        self.validate_logging_config(&config.logging)?;

        if config.storage.base_path.as_os_str().is_empty() {
            bail!("storage.base_path must not be empty");
        }

        Ok(())
    }

    fn validate_llm_config(&self, config: &LlmConfig) -> Result<()> {
        if config.endpoint.trim().is_empty() {
            bail!("llm.endpoint must not be empty");
        }

        if !config.endpoint.starts_with("http://") && !config.endpoint.starts_with("https://") {
            bail!("llm.endpoint must be an http(s) URL, got '{}'", config.endpoint);
        }

        if config.model.trim().is_empty() {
            bail!("llm.model must not be empty");
        }

        // Critiques degrade to an error message instead of failing startup
        if !config.has_api_key() {
            warn!("No API key configured; critiques will contain an error message");
        }

        if config.timeout_secs == Some(0) {
            bail!("llm.timeout_secs must be greater than 0 when set");
        }

        Ok(())
    }

    fn validate_analysis_config(&self, config: &AnalysisConfig) -> Result<()> {
        if config.excerpt_chars == 0 {
            bail!("analysis.excerpt_chars must be greater than 0");
        }

        if config.recent_limit == 0 {
            bail!("analysis.recent_limit must be greater than 0");
        }

        Ok(())
    }

    fn validate_logging_config(&self, config: &LoggingSettings) -> Result<()> {
        if !LOG_LEVELS.contains(&config.level.to_lowercase().as_str()) {
            bail!(
                "Invalid log level '{}', expected one of: {}",
                config.level,
                LOG_LEVELS.join(", ")
            );
        }

        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
