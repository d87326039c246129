//! End-to-end: ask about a dataset through a mock endpoint, export the answer.

use crate::helpers::sales_rows;
use datachat::ai::{ChatSession, ClientConfig, GeminiClient, RetryPolicy};
use datachat::export::{ExportFormat, ExportSource, Exporter, MemorySink};
use datachat::types::Dataset;
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const ANSWER: &str = "| region | units |\n|---|---|\n| east | 34 |\n| north | 24 |";

fn session_for(server: &mockito::ServerGuard) -> ChatSession {
    let client = GeminiClient::new(ClientConfig::new("secret").with_base_url(server.url())).unwrap();
    let mut session = ChatSession::new(Arc::new(client));
    session.set_dataset(&Dataset::new("sales", sales_rows()));
    session
}

#[tokio::test]
async fn test_answer_with_table_exports_to_csv() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Regex(r":generateContent$".to_string()))
        .match_query(Matcher::Any)
        .match_body(Matcher::Regex("Dataset: sales".to_string()))
        .with_status(200)
        .with_body(json!({"candidates": [{"content": {"parts": [{"text": ANSWER}]}}]}).to_string())
        .create_async()
        .await;

    let mut session = session_for(&server);
    let reply = session.ask("Units per region?").await.clone();
    mock.assert_async().await;

    assert!(reply.has_table);
    let mut exporter = Exporter::new(MemorySink::new());
    exporter.export(&ExportSource::from(reply.content), ExportFormat::Csv, "answer").unwrap();
    let artifact = &exporter.sink().artifacts()[0];
    assert_eq!(
        String::from_utf8(artifact.bytes.clone()).unwrap(),
        "region,units\neast,34\nnorth,24"
    );
}

#[tokio::test]
async fn test_rejected_key_becomes_error_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", Matcher::Any)
        .with_status(403)
        .create_async()
        .await;

    let mut session = session_for(&server);
    let reply = session.ask("anything").await;
    assert!(reply.is_error);
    assert!(reply.content.contains("API key"));
    assert_eq!(session.messages().len(), 2);
}

#[tokio::test]
async fn test_retry_recovers_from_overload() {
    let mut server = mockito::Server::new_async().await;
    let busy = server
        .mock("POST", Matcher::Any)
        .with_status(503)
        .expect(1)
        .create_async()
        .await;

    let mut session = session_for(&server).with_retry(RetryPolicy::new(2, Duration::from_millis(1)));
    let ok = server
        .mock("POST", Matcher::Any)
        .with_status(200)
        .with_body(json!({"candidates": [{"content": {"parts": [{"text": "fine"}]}}]}).to_string())
        .create_async()
        .await;

    assert_eq!(session.ask("q").await.content, "fine");
    busy.assert_async().await;
    ok.assert_async().await;
}
