//! Unit tests for the completion client against a mock HTTP server.

use datachat::ai::{AiError, ClientConfig, CompletionService, GeminiClient};
use mockito::Matcher;
use serde_json::json;

const PATH: &str = "/models/test-model:generateContent";

fn client(server: &mockito::ServerGuard) -> GeminiClient {
    GeminiClient::new(
        ClientConfig::new("secret")
            .with_base_url(server.url())
            .with_model("test-model"),
    )
    .unwrap()
}

fn reply(text: &str) -> String {
    json!({"candidates": [{"content": {"parts": [{"text": text}]}}]}).to_string()
}

#[tokio::test]
async fn test_successful_completion() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_query(Matcher::UrlEncoded("key".into(), "secret".into()))
        .match_body(Matcher::PartialJson(json!({
            "contents": [{"parts": [{"text": "How many rows?"}]}],
            "generationConfig": {"temperature": 0.7, "maxOutputTokens": 2048, "topK": 40}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply("There are **8** rows."))
        .create_async()
        .await;

    let text = client(&server).complete("How many rows?").await.unwrap();
    assert_eq!(text, "There are **8** rows.");
    mock.assert_async().await;
}

async fn error_for(status: usize, body: &str) -> AiError {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", PATH)
        .match_query(Matcher::Any)
        .with_status(status)
        .with_body(body)
        .create_async()
        .await;
    client(&server).complete("q").await.unwrap_err()
}

#[tokio::test]
async fn test_status_mapping() {
    assert!(matches!(error_for(401, "").await, AiError::InvalidApiKey));
    assert!(matches!(error_for(403, "").await, AiError::InvalidApiKey));
    assert!(matches!(
        error_for(400, r#"{"error":{"message":"API key not valid. Please pass a valid API key."}}"#).await,
        AiError::InvalidApiKey
    ));
    assert!(matches!(error_for(400, "bad field").await, AiError::Validation { .. }));
    assert!(matches!(error_for(429, "").await, AiError::QuotaExceeded));
    assert!(matches!(error_for(418, "").await, AiError::Unknown { .. }));

    let overloaded = error_for(503, "busy").await;
    assert!(matches!(overloaded, AiError::Overloaded { status: 503, .. }));
    assert!(overloaded.is_retryable());
}

#[tokio::test]
async fn test_empty_candidates_is_empty_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"candidates": []}"#)
        .create_async()
        .await;

    let err = client(&server).complete("q").await.unwrap_err();
    assert!(matches!(err, AiError::EmptyResponse));
    assert_eq!(err.kind().as_str(), "api");
}

#[tokio::test]
async fn test_blank_text_is_empty_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(reply("   "))
        .create_async()
        .await;

    assert!(matches!(
        client(&server).complete("q").await,
        Err(AiError::EmptyResponse)
    ));
}
