use crate::critic::NarrativeCritic;
use crate::pipeline::DocumentAnalyzer;
use anyhow::{Context, Result};
use extractor::{ContentSource, FetcherSettings, WebFetcher};
use infrastructure::config::{AppConfig, ConfigValidator};
use llm::{LlmClient, LlmSettings};
use std::sync::Arc;
use std::time::Duration;
use storage::DatabaseManager;
use tracing::info;

/// Process-wide resources, built once from configuration and passed around
/// explicitly.
pub struct AppContext {
    pub config: AppConfig,
    pub store: Arc<DatabaseManager>,
    pub analyzer: DocumentAnalyzer,
}

impl AppContext {
    pub async fn initialize(config: AppConfig) -> Result<Self> {
        ConfigValidator::new().validate(&config)?;

        let store = Arc::new(
            DatabaseManager::new(&config.storage.base_path)
                .await
                .with_context(|| {
                    format!("Failed to open storage at {:?}", config.storage.base_path)
                })?,
        );

        let fetcher = WebFetcher::new(FetcherSettings {
            user_agent: config.fetch.user_agent.clone(),
            timeout: config.fetch.timeout_secs.map(Duration::from_secs),
        })?;

        Self::with_source(config, Arc::new(fetcher), store)
    }

    /// Build around a caller-provided content source and store.
    pub fn with_source(
        config: AppConfig,
        source: Arc<dyn ContentSource>,
        store: Arc<DatabaseManager>,
    ) -> Result<Self> {
        let llm = &config.llm;
        let client = LlmClient::new(LlmSettings {
            api_key: llm.api_key.clone(),
            endpoint: llm.endpoint.clone(),
            model: llm.model.clone(),
            referer: llm.referer.clone(),
            app_title: llm.app_title.clone(),
            timeout: llm.timeout_secs.map(Duration::from_secs),
        })?;

        let critic = NarrativeCritic::new(client)
            .with_excerpt_chars(config.analysis.excerpt_chars)
            .with_concurrency(config.analysis.concurrent_critiques);

        let analyzer = DocumentAnalyzer::new(source, critic, store.clone());
        info!(model = %config.llm.model, "Application context initialized");

        Ok(Self {
            config,
            store,
            analyzer,
        })
    }

    pub fn shutdown(&self) -> Result<()> {
        self.store
            .shutdown()
            .context("Failed to flush session store")
    }
}
