use crate::critic::NarrativeCritic;
use crate::readability::flesch_reading_ease;
use crate::report::{AnalysisReport, AnalysisResults};
use common::OperationTimer;
use extractor::{ContentSource, FetchResult};
use std::sync::Arc;
use storage::{DatabaseManager, SessionRecord, StorageError};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Failed to extract content: {message}")]
    Fetch { url: String, message: String },

    #[error("Failed to persist analysis: {0}")]
    Storage(#[from] StorageError),
}

/// Fetch, score, critique and persist one documentation page.
pub struct DocumentAnalyzer {
    source: Arc<dyn ContentSource>,
    critic: NarrativeCritic,
    store: Arc<DatabaseManager>,
}

impl DocumentAnalyzer {
    pub fn new(
        source: Arc<dyn ContentSource>,
        critic: NarrativeCritic,
        store: Arc<DatabaseManager>,
    ) -> Self {
        Self {
            source,
            critic,
            store,
        }
    }

    pub fn critic(&self) -> &NarrativeCritic {
        &self.critic
    }

    /// Fetch only. A failed fetch becomes [`AnalyzeError::Fetch`].
    pub async fn fetch(&self, url: &str) -> Result<FetchResult, AnalyzeError> {
        let fetched = self.source.fetch(url).await;
        if !fetched.success {
            let message = fetched
                .error
                .unwrap_or_else(|| "Unknown error".to_string());
            warn!(url = %url, error = %message, "Fetch failed, nothing will be stored");
            return Err(AnalyzeError::Fetch {
                url: url.to_string(),
                message,
            });
        }
        Ok(fetched)
    }

    /// Score and critique already-extracted text, then persist the session.
    ///
    /// The four critiques and the score all come from `text`; storage errors
    /// are returned after the critiques have run.
    pub async fn analyze_document(
        &self,
        session_id: &str,
        url: &str,
        text: &str,
    ) -> Result<AnalysisResults, AnalyzeError> {
        let mut timer = OperationTimer::new("analyze_document");
        timer.add_field("session_id", session_id);
        timer.add_field("url", url);

        let readability_score = flesch_reading_ease(text);
        let critiques = self.critic.critique_all(text, readability_score).await;

        let record = SessionRecord {
            session_id: session_id.to_string(),
            url: url.to_string(),
            readability: critiques.readability.text.clone(),
            structure: critiques.structure.text.clone(),
            completeness: critiques.completeness.text.clone(),
            style: critiques.style.text.clone(),
        };

        if let Err(e) = self.store.save(&record, text, Some(readability_score)).await {
            timer.finish_with_error(&e.to_string());
            return Err(e.into());
        }

        timer.add_field("readability_score", readability_score);
        timer.add_field("degraded", critiques.degraded().len());
        timer.finish();

        Ok(AnalysisResults {
            readability_score,
            critiques,
        })
    }

    /// The whole flow under a fresh session id.
    pub async fn analyze_url(&self, url: &str) -> Result<AnalysisReport, AnalyzeError> {
        let fetched = self.fetch(url).await?;
        self.analyze_text(url, &fetched.content).await
    }

    /// Analyze text that was already fetched, under a fresh session id.
    pub async fn analyze_text(&self, url: &str, text: &str) -> Result<AnalysisReport, AnalyzeError> {
        let session_id = Uuid::new_v4().to_string();
        info!(session_id = %session_id, url = %url, "Starting analysis");

        let results = self.analyze_document(&session_id, url, text).await?;
        Ok(AnalysisReport::from_results(&session_id, url, &results))
    }

    /// Reload a stored session. The score comes from the content entry when
    /// one exists.
    pub async fn load_session(&self, session_id: &str) -> Result<Option<AnalysisReport>, AnalyzeError> {
        let Some(record) = self.store.get_session(session_id).await? else {
            return Ok(None);
        };

        let score = self
            .store
            .content_for(&record.url, &record.session_id)?
            .and_then(|entry| entry.readability_score);

        Ok(Some(AnalysisReport::from_record(record, score)))
    }
}
