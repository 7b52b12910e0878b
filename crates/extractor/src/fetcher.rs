use crate::html::{extract_title, html_to_markdown};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

/// Outcome of fetching one page. Failures are data, not errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    pub content: String,
    pub title: String,
    pub url: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchResult {
    pub fn succeeded(url: &str, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            title: title.into(),
            url: url.to_string(),
            success: true,
            error: None,
        }
    }

    /// A failed fetch never carries content.
    pub fn failed(url: &str, error: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            title: String::new(),
            url: url.to_string(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Anything that can turn a URL into article text.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Never fails; check [`FetchResult::success`].
    async fn fetch(&self, url: &str) -> FetchResult;
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported URL scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status} while fetching {url}")]
    Status { status: u16, url: String },
}

#[derive(Debug, Clone)]
pub struct FetcherSettings {
    pub user_agent: String,
    /// `None` keeps the HTTP client's default behaviour
    pub timeout: Option<Duration>,
}

impl Default for FetcherSettings {
    fn default() -> Self {
        Self {
            user_agent: format!("docimprove/{}", env!("CARGO_PKG_VERSION")),
            timeout: None,
        }
    }
}

/// Fetches pages over HTTP and keeps the main article body.
#[derive(Clone)]
pub struct WebFetcher {
    client: Client,
}

struct Extraction {
    title: String,
    content: String,
    fitted: bool,
}

impl WebFetcher {
    pub fn new(settings: FetcherSettings) -> Result<Self> {
        let mut builder = Client::builder().user_agent(settings.user_agent);
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { client })
    }

    async fn try_fetch(&self, raw_url: &str) -> std::result::Result<Extraction, FetchError> {
        let url = Url::parse(raw_url.trim()).map_err(|e| FetchError::InvalidUrl {
            url: raw_url.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::UnsupportedScheme(url.scheme().to_string()));
        }

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("html"))
            .unwrap_or(true);

        // Redirects may have moved us to another host
        let final_url = response.url().clone();
        let body = response.text().await?;

        if !is_html {
            return Ok(Extraction {
                title: String::new(),
                content: body.trim().to_string(),
                fitted: false,
            });
        }

        Ok(extract_article(&body, &final_url))
    }
}

/// Prefer the main-content rendering; fall back to the whole page when the
/// article heuristics find nothing.
fn extract_article(html: &str, url: &Url) -> Extraction {
    let mut title = String::new();

    let fitted = match readability::extractor::extract(&mut Cursor::new(html.as_bytes()), url) {
        Ok(product) => {
            title = product.title.trim().to_string();
            Some(html_to_markdown(&product.content, Some(url)))
        }
        Err(_) => {
            debug!("Main-content extraction found no article body");
            None
        }
    };

    if title.is_empty() {
        title = extract_title(html).unwrap_or_default();
    }

    match fitted.filter(|content| !content.trim().is_empty()) {
        Some(content) => Extraction {
            title,
            content,
            fitted: true,
        },
        None => Extraction {
            title,
            content: html_to_markdown(html, Some(url)),
            fitted: false,
        },
    }
}

#[async_trait]
impl ContentSource for WebFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        let start = Instant::now();

        match self.try_fetch(url).await {
            Ok(extraction) => {
                info!(
                    url = %url,
                    chars = extraction.content.chars().count(),
                    fitted = extraction.fitted,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Extracted article content"
                );
                FetchResult::succeeded(url, extraction.title, extraction.content)
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Content extraction failed");
                FetchResult::failed(url, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result_has_no_content() {
        let result = FetchResult::failed("https://x.test", "boom");
        assert!(!result.success);
        assert!(result.content.is_empty());
        assert_eq!(result.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_extract_article_falls_back_to_full_page() {
        let url = Url::parse("https://docs.example.com/a").expect("url");
        let html = "<html><head><title>Tiny</title></head><body><nav>Menu</nav><p>Hi.</p></body></html>";

        let extraction = extract_article(html, &url);

        assert_eq!(extraction.title, "Tiny");
        assert!(extraction.content.contains("Hi."));
        assert!(!extraction.content.contains("Menu"));
    }
}
