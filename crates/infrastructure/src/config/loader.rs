use super::model::AppConfig;
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    File(PathBuf),
    Default,
}

const ENV_PREFIX: &str = "DOCIMPROVE_";

pub struct ConfigLoader {
    explicit_path: Option<PathBuf>,
    config_paths: Vec<PathBuf>,
    load_dotenv: bool,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            explicit_path: None,
            config_paths: Self::default_config_paths(),
            load_dotenv: true,
        }
    }

    /// Use exactly this file. The search paths are skipped and any read or
    /// parse failure is returned instead of falling back to defaults.
    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.explicit_path = Some(path);
        self
    }

    /// Search only the given paths.
    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.config_paths = paths;
        self
    }

    pub fn without_dotenv(mut self) -> Self {
        self.load_dotenv = false;
        self
    }

    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("docimprove.toml"),
            PathBuf::from(".docimproverc.toml"),
            PathBuf::from(".docimproverc.json"),
        ];

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".docimproverc.toml"));
            paths.push(
                home_dir
                    .join(".config")
                    .join("docimprove")
                    .join("config.toml"),
            );
        }

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("docimprove").join("config.toml"));
            paths.push(config_dir.join("docimprove").join("config.json"));
        }

        paths
    }

    pub async fn load(&self) -> Result<AppConfig> {
        let (config, _) = self.load_with_source().await?;
        Ok(config)
    }

    /// Load and report which file (if any) the base config came from.
    pub async fn load_with_source(&self) -> Result<(AppConfig, ConfigSource)> {
        if self.load_dotenv {
            // A missing .env is the normal case
            dotenv::dotenv().ok();
        }

        let (config, source) = self.load_base_config().await?;
        let config = self.apply_env_overrides(config)?;

        debug!("Configuration resolved from {:?}", source);
        Ok((config, source))
    }

    async fn load_base_config(&self) -> Result<(AppConfig, ConfigSource)> {
        if let Some(path) = &self.explicit_path {
            let config = self
                .load_file(path)
                .await
                .with_context(|| format!("Invalid config file {}", path.display()))?;
            info!("Loaded configuration from: {}", path.display());
            return Ok((config, ConfigSource::File(path.clone())));
        }

        for path in &self.config_paths {
            if path.exists() {
                match self.load_file(path).await {
                    Ok(file_config) => {
                        info!("Loaded configuration from: {}", path.display());
                        return Ok((file_config, ConfigSource::File(path.clone())));
                    }
                    Err(e) => {
                        warn!("Failed to load config from {}: {:#}", path.display(), e);
                    }
                }
            }
        }

        Ok((AppConfig::default(), ConfigSource::Default))
    }

    async fn load_file(&self, path: &Path) -> Result<AppConfig> {
        let content = fs::read_to_string(path)
            .await
            .context("Failed to read config file")?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" | "" => toml::from_str(&content).context("Failed to parse TOML config"),
            "json" => serde_json::from_str(&content).context("Failed to parse JSON config"),
            _ => {
                // Try TOML first, then JSON
                toml::from_str(&content)
                    .or_else(|_| serde_json::from_str(&content))
                    .context("Failed to parse config file")
            }
        }
    }

    fn apply_env_overrides(&self, mut config: AppConfig) -> Result<AppConfig> {
        // The provider's conventional variable name, then our prefixed one
        if let Ok(api_key) = env::var("OPENROUTER_API_KEY") {
            config.llm.api_key = Some(api_key);
        }

        if let Ok(api_key) = env::var(format!("{}API_KEY", ENV_PREFIX)) {
            config.llm.api_key = Some(api_key);
        }

        if let Ok(model) = env::var(format!("{}MODEL", ENV_PREFIX)) {
            config.llm.model = model;
        }

        if let Ok(endpoint) = env::var(format!("{}ENDPOINT", ENV_PREFIX)) {
            config.llm.endpoint = endpoint;
        }

        if let Ok(data_dir) = env::var(format!("{}DATA_DIR", ENV_PREFIX)) {
            config.storage.base_path = PathBuf::from(data_dir);
        }

        if let Ok(level) = env::var(format!("{}LOG_LEVEL", ENV_PREFIX)) {
            config.logging.level = level;
        }

        if let Ok(json) = env::var(format!("{}LOG_JSON", ENV_PREFIX)) {
            config.logging.json = parse_flag(&json)
                .with_context(|| format!("Invalid {}LOG_JSON value: {}", ENV_PREFIX, json))?;
        }

        if let Ok(concurrent) = env::var(format!("{}CONCURRENT_CRITIQUES", ENV_PREFIX)) {
            config.analysis.concurrent_critiques = parse_flag(&concurrent).with_context(|| {
                format!(
                    "Invalid {}CONCURRENT_CRITIQUES value: {}",
                    ENV_PREFIX, concurrent
                )
            })?;
        }

        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got '{}'", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE").expect("valid"));
        assert!(parse_flag(" on ").expect("valid"));
        assert!(!parse_flag("0").expect("valid"));
        assert!(parse_flag("maybe").is_err());
    }
}
