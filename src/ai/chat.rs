//! Chat session over a [`CompletionService`].
//!
//! Failures never escape a session: they are logged and appended as an
//! assistant message flagged `is_error`, carrying the user-facing text.

use super::client::CompletionService;
use super::error::AiError;
use super::prompt::{
    analysis_prompt, chart_suggestion_prompt, chat_prompt, data_context, parse_chart_suggestions,
};
use super::retry::{RetryPolicy, retry_request};
use crate::export::detect_table_data;
use crate::types::{ChartConfig, Dataset};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_MESSAGE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: u64,
    pub role: ChatRole,
    pub content: String,
    pub is_error: bool,
    /// Content contains something exportable as CSV
    pub has_table: bool,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: ChatRole, content: impl Into<String>, is_error: bool) -> Self {
        let content = content.into();
        Self {
            id: NEXT_MESSAGE_ID.fetch_add(1, Ordering::Relaxed),
            role,
            has_table: !is_error && role == ChatRole::Assistant && detect_table_data(&content),
            content,
            is_error,
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content, false)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content, false)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content, true)
    }
}

pub struct ChatSession {
    service: Arc<dyn CompletionService>,
    context: Option<String>,
    messages: Vec<ChatMessage>,
    retry: Option<RetryPolicy>,
}

impl ChatSession {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self {
            service,
            context: None,
            messages: Vec::new(),
            retry: None,
        }
    }

    /// Retry transient failures with `policy` instead of failing at once.
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Attach a dataset; later prompts describe it to the model.
    pub fn set_dataset(&mut self, dataset: &Dataset) {
        self.context = Some(data_context(dataset, &dataset.columns()));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn context(&self) -> &str {
        self.context.as_deref().unwrap_or("No dataset loaded.")
    }

    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        let service = &self.service;
        match self.retry {
            Some(policy) => retry_request(policy, move || service.complete(prompt)).await,
            None => service.complete(prompt).await,
        }
    }

    fn push_result(&mut self, result: Result<String, AiError>) -> &ChatMessage {
        let message = match result {
            Ok(text) => ChatMessage::assistant(text),
            Err(err) => {
                tracing::error!(kind = err.kind().as_str(), error = %err, "Completion failed");
                ChatMessage::error(err.user_message())
            }
        };
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Ask a question; returns the appended reply.
    pub async fn ask(&mut self, question: &str) -> &ChatMessage {
        let prompt = chat_prompt(self.context(), &self.messages, question);
        self.messages.push(ChatMessage::user(question));
        let result = self.complete(&prompt).await;
        self.push_result(result)
    }

    /// Request a general analysis of the attached dataset.
    pub async fn analyze(&mut self) -> &ChatMessage {
        let prompt = analysis_prompt(self.context());
        let result = self.complete(&prompt).await;
        self.push_result(result)
    }

    /// Ask the model for chart configurations. Not recorded in the history.
    pub async fn suggest_charts(&self) -> Result<Vec<ChartConfig>, AiError> {
        let reply = self.complete(&chart_suggestion_prompt(self.context())).await?;
        Ok(parse_chart_suggestions(&reply))
    }
}
