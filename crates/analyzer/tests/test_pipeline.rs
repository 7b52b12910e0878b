use analyzer::{
    AnalyzeError, AppContext, CritiqueCategory, CritiqueOutcome, DocumentAnalyzer,
    NarrativeCritic, EMPTY_TEXT_SCORE,
};
use async_trait::async_trait;
use extractor::{ContentSource, FetchResult};
use infrastructure::AppConfig;
use llm::{LlmClient, LlmSettings, MISSING_API_KEY_MESSAGE};
use mockito::Server;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use storage::DatabaseManager;
use tempfile::TempDir;

/// Serves a fixed page and counts how often it was asked.
struct StaticSource {
    result: FetchResult,
    calls: AtomicUsize,
}

impl StaticSource {
    fn ok(content: &str) -> Arc<Self> {
        Arc::new(Self {
            result: FetchResult::succeeded("https://docs.example.com/a", "A", content),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(error: &str) -> Arc<Self> {
        Arc::new(Self {
            result: FetchResult::failed("https://docs.example.com/a", error),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ContentSource for StaticSource {
    async fn fetch(&self, _url: &str) -> FetchResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

fn client(endpoint: &str, api_key: Option<&str>) -> LlmClient {
    LlmClient::new(LlmSettings {
        api_key: api_key.map(str::to_string),
        endpoint: endpoint.to_string(),
        model: "test-model".to_string(),
        referer: "https://docs.example.com".to_string(),
        app_title: "Doc Improver".to_string(),
        timeout: None,
    })
    .expect("client")
}

fn completion(content: &str) -> String {
    json!({"choices": [{"message": {"role": "assistant", "content": content}}]}).to_string()
}

#[tokio::test]
async fn test_end_to_end_analysis_is_persisted() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion("## Assessment\nOK"))
        .expect(4)
        .create_async()
        .await;

    let dir = TempDir::new().expect("tempdir");
    let store = Arc::new(DatabaseManager::new(dir.path()).await.expect("store"));
    let source = StaticSource::ok("Hello world.");
    let analyzer = DocumentAnalyzer::new(
        source.clone(),
        NarrativeCritic::new(client(&server.url(), Some("key"))),
        store.clone(),
    );

    let url = "https://docs.example.com/a";
    let report = analyzer.analyze_url(url).await.expect("analysis");

    for category in CritiqueCategory::ALL {
        assert_eq!(report.critique(category), "## Assessment\nOK");
    }
    let score = report.readability_score.expect("fresh report has a score");
    assert!(score.is_finite());
    assert!(report.degraded.is_empty());
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    mock.assert_async().await;

    let stored = store
        .get_session(&report.session_id)
        .await
        .expect("get")
        .expect("session stored");
    assert_eq!(stored.url, url);
    assert_eq!(stored.readability, "## Assessment\nOK");
    assert_eq!(stored.structure, "## Assessment\nOK");
    assert_eq!(stored.completeness, "## Assessment\nOK");
    assert_eq!(stored.style, "## Assessment\nOK");

    let entry = store
        .content_for(url, &report.session_id)
        .expect("content")
        .expect("content stored");
    assert_eq!(entry.content, "Hello world.");

    let reloaded = analyzer
        .load_session(&report.session_id)
        .await
        .expect("load")
        .expect("present");
    assert_eq!(reloaded.readability_score, Some(score));
    assert_eq!(reloaded.style, report.style);
}

#[tokio::test]
async fn test_fetch_failure_stores_nothing() {
    let store = Arc::new(DatabaseManager::ephemeral().expect("store"));
    let analyzer = DocumentAnalyzer::new(
        StaticSource::failing("HTTP 404 while fetching https://docs.example.com/a"),
        NarrativeCritic::new(client("http://127.0.0.1:9", Some("key"))),
        store.clone(),
    );

    let err = analyzer
        .analyze_url("https://docs.example.com/a")
        .await
        .expect_err("fetch should fail");

    match &err {
        AnalyzeError::Fetch { url, message } => {
            assert_eq!(url, "https://docs.example.com/a");
            assert!(message.contains("404"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().starts_with("Failed to extract content: "));
    assert_eq!(store.session_count().await.expect("count"), 0);
}

#[tokio::test]
async fn test_missing_key_still_completes_and_persists() {
    let store = Arc::new(DatabaseManager::ephemeral().expect("store"));
    let analyzer = DocumentAnalyzer::new(
        StaticSource::ok(""),
        NarrativeCritic::new(client("http://127.0.0.1:9", None)).with_concurrency(true),
        store.clone(),
    );

    let results = analyzer
        .analyze_document("sess-1", "https://docs.example.com/a", "")
        .await
        .expect("analysis");

    assert_eq!(results.readability_score, EMPTY_TEXT_SCORE);
    for critique in results.critiques.iter() {
        assert_eq!(critique.text, MISSING_API_KEY_MESSAGE);
        assert_eq!(critique.outcome, CritiqueOutcome::MissingApiKey);
    }

    let stored = store.get_session("sess-1").await.expect("get").expect("present");
    assert_eq!(stored.completeness, MISSING_API_KEY_MESSAGE);
}

#[tokio::test]
async fn test_endpoint_errors_are_recorded_as_text() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let store = Arc::new(DatabaseManager::ephemeral().expect("store"));
    let analyzer = DocumentAnalyzer::new(
        StaticSource::ok("Some documentation text that needs review."),
        NarrativeCritic::new(client(&server.url(), Some("key"))),
        store.clone(),
    );

    let report = analyzer
        .analyze_url("https://docs.example.com/a")
        .await
        .expect("analysis still succeeds");

    assert_eq!(report.degraded, CritiqueCategory::ALL.to_vec());
    assert_eq!(report.structure, "API Error: HTTP 500 - upstream exploded");
}

#[tokio::test]
async fn test_unknown_session_loads_as_none() {
    let analyzer = DocumentAnalyzer::new(
        StaticSource::ok("x"),
        NarrativeCritic::new(client("http://127.0.0.1:9", None)),
        Arc::new(DatabaseManager::ephemeral().expect("store")),
    );

    assert!(analyzer.load_session("does-not-exist").await.expect("load").is_none());
}

#[tokio::test]
async fn test_context_initializes_from_config() {
    let dir = TempDir::new().expect("tempdir");
    let mut config = AppConfig::default();
    config.storage.base_path = dir.path().join("data");
    config.llm.api_key = None;

    let context = AppContext::initialize(config).await.expect("context");
    assert!(!context.analyzer.critic().has_api_key());
    assert!(dir.path().join("data").join("sessions.db").exists());
    assert_eq!(context.store.session_count().await.expect("count"), 0);

    context.shutdown().expect("shutdown");
}
