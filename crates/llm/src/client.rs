use crate::outcome::{render_json, CompletionOutcome};
use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Connection settings for the chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    /// Base URL; `/chat/completions` is appended
    pub endpoint: String,
    pub model: String,
    /// Sent as `HTTP-Referer`
    pub referer: String,
    /// Sent as `X-Title`
    pub app_title: String,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    content: String,
}

#[derive(Clone)]
pub struct LlmClient {
    settings: LlmSettings,
    client: Client,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { settings, client })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    fn api_key(&self) -> Option<&str> {
        self.settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.endpoint.trim_end_matches('/')
        )
    }

    /// Send one user message and classify whatever comes back.
    pub async fn complete(&self, prompt: &str) -> CompletionOutcome {
        let Some(api_key) = self.api_key() else {
            warn!("Skipping completion request: no API key configured");
            return CompletionOutcome::MissingApiKey;
        };

        let request = ChatCompletionRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage::user(prompt)],
        };

        info!(model = %self.settings.model, "Sending chat completion request");
        debug!(prompt_chars = prompt.chars().count(), "Prompt prepared");

        let start = Instant::now();
        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", &self.settings.referer)
            .header("X-Title", &self.settings.app_title)
            .json(&request)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Chat completion request failed");
                return CompletionOutcome::Connection(e.to_string());
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return CompletionOutcome::Connection(e.to_string()),
        };

        let outcome = classify_response(status.as_u16(), status.is_success(), &body);
        debug!(
            status = status.as_u16(),
            outcome = outcome.kind(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Chat completion finished"
        );
        outcome
    }

    /// [`complete`](Self::complete) flattened to displayable text.
    pub async fn complete_text(&self, prompt: &str) -> String {
        self.complete(prompt).await.into_text()
    }
}

fn classify_response(status: u16, success: bool, body: &str) -> CompletionOutcome {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    if !success {
        let detail = match &parsed {
            Some(json) => render_json(json.get("error").unwrap_or(json)),
            None => body.to_string(),
        };
        return CompletionOutcome::HttpStatus { status, detail };
    }

    let Some(json) = parsed else {
        return CompletionOutcome::NonJson(body.to_string());
    };

    if let Some(error) = json.get("error") {
        return CompletionOutcome::Api(render_json(error));
    }

    match serde_json::from_value::<ChatCompletionResponse>(json.clone()) {
        Ok(response) => match response.choices.into_iter().next() {
            Some(choice) => CompletionOutcome::Completed(choice.message.content),
            None => CompletionOutcome::UnexpectedFormat(json.to_string()),
        },
        Err(_) => CompletionOutcome::UnexpectedFormat(json.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_success() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"hi"}}]}"#;
        assert_eq!(
            classify_response(200, true, body),
            CompletionOutcome::Completed("hi".to_string())
        );
    }

    #[test]
    fn test_classify_status_prefers_error_member() {
        let body = r#"{"error":{"message":"No auth credentials found","code":401}}"#;
        match classify_response(401, false, body) {
            CompletionOutcome::HttpStatus { status, detail } => {
                assert_eq!(status, 401);
                assert!(detail.contains("No auth credentials found"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_classify_status_with_plain_body() {
        assert_eq!(
            classify_response(502, false, "Bad Gateway"),
            CompletionOutcome::HttpStatus {
                status: 502,
                detail: "Bad Gateway".to_string()
            }
        );
    }

    #[test]
    fn test_classify_malformed_bodies() {
        assert_eq!(
            classify_response(200, true, "<html>oops</html>"),
            CompletionOutcome::NonJson("<html>oops</html>".to_string())
        );
        assert_eq!(
            classify_response(200, true, r#"{"error":"quota"}"#),
            CompletionOutcome::Api("quota".to_string())
        );
        assert_eq!(
            classify_response(200, true, r#"{"id":"x"}"#),
            CompletionOutcome::UnexpectedFormat(r#"{"id":"x"}"#.to_string())
        );
        assert_eq!(
            classify_response(200, true, r#"{"choices":[]}"#),
            CompletionOutcome::UnexpectedFormat(r#"{"choices":[]}"#.to_string())
        );
    }

    #[test]
    fn test_completions_url_trims_slash() {
        let client = LlmClient::new(LlmSettings {
            api_key: None,
            endpoint: "http://localhost:1234/v1/".to_string(),
            model: "m".to_string(),
            referer: String::new(),
            app_title: String::new(),
            timeout: None,
        })
        .expect("client builds");

        assert_eq!(
            client.completions_url(),
            "http://localhost:1234/v1/chat/completions"
        );
        assert!(!client.has_api_key());
    }
}
