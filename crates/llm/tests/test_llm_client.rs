use llm::{CompletionOutcome, LlmClient, LlmSettings, MISSING_API_KEY_MESSAGE};
use mockito::{Matcher, Server};
use serde_json::json;

fn settings(endpoint: &str, api_key: Option<&str>) -> LlmSettings {
    LlmSettings {
        api_key: api_key.map(str::to_string),
        endpoint: endpoint.to_string(),
        model: "meta-llama/llama-3.3-8b-instruct:free".to_string(),
        referer: "https://docs.example.com".to_string(),
        app_title: "Doc Improver".to_string(),
        timeout: None,
    }
}

fn create_mock_response(content: &str) -> String {
    json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": content
            }
        }]
    })
    .to_string()
}

#[tokio::test]
async fn test_completion_sends_expected_request() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_header("content-type", "application/json")
        .match_header("http-referer", "https://docs.example.com")
        .match_header("x-title", "Doc Improver")
        .match_body(Matcher::Json(json!({
            "model": "meta-llama/llama-3.3-8b-instruct:free",
            "messages": [{"role": "user", "content": "Analyze this"}]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(create_mock_response("## Assessment\nLooks fine"))
        .create_async()
        .await;

    let client = LlmClient::new(settings(&server.url(), Some("test-key"))).expect("client");
    let outcome = client.complete("Analyze this").await;

    assert_eq!(
        outcome,
        CompletionOutcome::Completed("## Assessment\nLooks fine".to_string())
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_api_key_never_hits_the_network() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .expect(0)
        .create_async()
        .await;

    for key in [None, Some(""), Some("   ")] {
        let client = LlmClient::new(settings(&server.url(), key)).expect("client");
        assert!(!client.has_api_key());
        assert_eq!(client.complete("prompt").await, CompletionOutcome::MissingApiKey);
        assert_eq!(client.complete_text("prompt").await, MISSING_API_KEY_MESSAGE);
    }

    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_success_status_is_reported_with_code() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(503)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"message":"Provider overloaded"}}"#)
        .create_async()
        .await;

    let client = LlmClient::new(settings(&server.url(), Some("k"))).expect("client");
    let text = client.complete_text("prompt").await;

    assert!(text.starts_with("API Error: HTTP 503 - "));
    assert!(text.contains("Provider overloaded"));
}

#[tokio::test]
async fn test_non_success_status_with_html_body() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(500)
        .with_body("<html>Internal Server Error</html>")
        .create_async()
        .await;

    let client = LlmClient::new(settings(&server.url(), Some("k"))).expect("client");
    let outcome = client.complete("prompt").await;

    assert_eq!(
        outcome,
        CompletionOutcome::HttpStatus {
            status: 500,
            detail: "<html>Internal Server Error</html>".to_string()
        }
    );
    assert!(outcome.into_text().contains("500"));
}

#[tokio::test]
async fn test_malformed_success_bodies_degrade_to_text() {
    let mut server = Server::new_async().await;
    let client = LlmClient::new(settings(&server.url(), Some("k"))).expect("client");

    let non_json = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body("not json at all")
        .create_async()
        .await;
    assert_eq!(
        client.complete_text("p").await,
        "API Error: Non-JSON response - not json at all"
    );
    non_json.remove_async().await;

    let api_error = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"error":"Rate limit exceeded"}"#)
        .create_async()
        .await;
    assert_eq!(
        client.complete_text("p").await,
        "API Error: Rate limit exceeded"
    );
    api_error.remove_async().await;

    let _no_choices = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"id":"gen-1"}"#)
        .create_async()
        .await;
    assert_eq!(
        client.complete_text("p").await,
        r#"Unexpected API response format: {"id":"gen-1"}"#
    );
}

#[tokio::test]
async fn test_connection_failure_becomes_text() {
    // Nothing listens on port 9 on test machines
    let client =
        LlmClient::new(settings("http://127.0.0.1:9", Some("k"))).expect("client");
    let outcome = client.complete("prompt").await;

    assert!(matches!(outcome, CompletionOutcome::Connection(_)));
    assert!(outcome.into_text().starts_with("Error connecting to API: "));
}
