use crate::prompts::{render_prompt, CritiqueCategory};
use common::excerpt;
use infrastructure::config::model::DEFAULT_EXCERPT_CHARS;
use llm::{CompletionOutcome, LlmClient};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

/// How a critique call ended. Anything but `Completed` means the text is a
/// fixed failure message rather than model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "status", rename_all = "snake_case")]
pub enum CritiqueOutcome {
    Completed,
    MissingApiKey,
    Connection,
    HttpStatus(u16),
    NonJson,
    Api,
    UnexpectedFormat,
}

impl CritiqueOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CritiqueOutcome::Completed)
    }
}

impl From<&CompletionOutcome> for CritiqueOutcome {
    fn from(outcome: &CompletionOutcome) -> Self {
        match outcome {
            CompletionOutcome::Completed(_) => CritiqueOutcome::Completed,
            CompletionOutcome::MissingApiKey => CritiqueOutcome::MissingApiKey,
            CompletionOutcome::Connection(_) => CritiqueOutcome::Connection,
            CompletionOutcome::HttpStatus { status, .. } => CritiqueOutcome::HttpStatus(*status),
            CompletionOutcome::NonJson(_) => CritiqueOutcome::NonJson,
            CompletionOutcome::Api(_) => CritiqueOutcome::Api,
            CompletionOutcome::UnexpectedFormat(_) => CritiqueOutcome::UnexpectedFormat,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Critique {
    pub category: CritiqueCategory,
    pub text: String,
    pub outcome: CritiqueOutcome,
}

impl Critique {
    pub fn is_degraded(&self) -> bool {
        !self.outcome.is_completed()
    }
}

/// One critique per category, all produced from the same content snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CritiqueSet {
    pub readability: Critique,
    pub structure: Critique,
    pub completeness: Critique,
    pub style: Critique,
}

impl CritiqueSet {
    pub fn get(&self, category: CritiqueCategory) -> &Critique {
        match category {
            CritiqueCategory::Readability => &self.readability,
            CritiqueCategory::Structure => &self.structure,
            CritiqueCategory::Completeness => &self.completeness,
            CritiqueCategory::Style => &self.style,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Critique> {
        CritiqueCategory::ALL.into_iter().map(move |c| self.get(c))
    }

    pub fn degraded(&self) -> Vec<CritiqueCategory> {
        self.iter()
            .filter(|c| c.is_degraded())
            .map(|c| c.category)
            .collect()
    }
}

/// Asks the model for a qualitative review of documentation text.
#[derive(Clone)]
pub struct NarrativeCritic {
    client: LlmClient,
    excerpt_chars: usize,
    concurrent: bool,
}

impl NarrativeCritic {
    pub fn new(client: LlmClient) -> Self {
        Self {
            client,
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
            concurrent: false,
        }
    }

    pub fn with_excerpt_chars(mut self, excerpt_chars: usize) -> Self {
        self.excerpt_chars = excerpt_chars;
        self
    }

    /// Issue the four calls of [`critique_all`](Self::critique_all) at once.
    pub fn with_concurrency(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.client.has_api_key()
    }

    pub async fn critique_readability(&self, text: &str, score: f64) -> String {
        self.critique(CritiqueCategory::Readability, text, score)
            .await
            .text
    }

    pub async fn critique_structure(&self, text: &str) -> String {
        self.critique(CritiqueCategory::Structure, text, 0.0).await.text
    }

    pub async fn critique_completeness(&self, text: &str) -> String {
        self.critique(CritiqueCategory::Completeness, text, 0.0)
            .await
            .text
    }

    pub async fn critique_style(&self, text: &str) -> String {
        self.critique(CritiqueCategory::Style, text, 0.0).await.text
    }

    /// `score` is only used by the readability prompt.
    pub async fn critique(&self, category: CritiqueCategory, text: &str, score: f64) -> Critique {
        let article = excerpt(text, self.excerpt_chars);
        let prompt = render_prompt(category, article, score);
        debug!(
            category = %category,
            article_chars = article.chars().count(),
            "Rendered critique prompt"
        );

        let start = Instant::now();
        let completion = self.client.complete(&prompt).await;
        let outcome = CritiqueOutcome::from(&completion);

        if outcome.is_completed() {
            info!(
                category = %category,
                duration_ms = start.elapsed().as_millis() as u64,
                "Critique completed"
            );
        } else {
            warn!(category = %category, outcome = completion.kind(), "Critique degraded");
        }

        Critique {
            category,
            text: completion.into_text(),
            outcome,
        }
    }

    pub async fn critique_all(&self, text: &str, score: f64) -> CritiqueSet {
        if self.concurrent {
            let (readability, structure, completeness, style) = tokio::join!(
                self.critique(CritiqueCategory::Readability, text, score),
                self.critique(CritiqueCategory::Structure, text, score),
                self.critique(CritiqueCategory::Completeness, text, score),
                self.critique(CritiqueCategory::Style, text, score),
            );
            return CritiqueSet {
                readability,
                structure,
                completeness,
                style,
            };
        }

        CritiqueSet {
            readability: self.critique(CritiqueCategory::Readability, text, score).await,
            structure: self.critique(CritiqueCategory::Structure, text, score).await,
            completeness: self.critique(CritiqueCategory::Completeness, text, score).await,
            style: self.critique(CritiqueCategory::Style, text, score).await,
        }
    }
}
