//! Prompt templates.
//!
//! Every prompt starts from the same data context: dataset name, row count,
//! the inferred columns and a handful of sample rows as JSON.

use super::chat::{ChatMessage, ChatRole};
use crate::constants::CONTEXT_SAMPLE_ROWS;
use crate::types::{ChartConfig, ColumnDescriptor, Dataset};
use once_cell::sync::Lazy;
use regex::Regex;

static JSON_FENCE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("Hard-coded regex pattern should be valid")
});

/// Describe `dataset` for the model.
pub fn data_context(dataset: &Dataset, columns: &[ColumnDescriptor]) -> String {
    let mut out = format!(
        "Dataset: {}\nRows: {}\nColumns:\n",
        dataset.name,
        dataset.row_count()
    );
    for column in columns {
        let mut flags = Vec::new();
        if column.nullable {
            flags.push("nullable");
        }
        if column.unique {
            flags.push("unique");
        }
        if flags.is_empty() {
            out.push_str(&format!("- {} ({})\n", column.name, column.inferred_type.label()));
        } else {
            out.push_str(&format!(
                "- {} ({}, {})\n",
                column.name,
                column.inferred_type.label(),
                flags.join(", ")
            ));
        }
    }

    let sample: Vec<String> = dataset
        .rows
        .iter()
        .take(CONTEXT_SAMPLE_ROWS)
        .map(|row| row.to_json_string())
        .collect();
    if !sample.is_empty() {
        out.push_str(&format!("Sample rows ({}):\n", sample.len()));
        out.push_str(&sample.join("\n"));
        out.push('\n');
    }
    out
}

pub fn analysis_prompt(context: &str) -> String {
    format!(
        "You are a data analyst. Analyze the dataset below.\n\n{}\n\
         Respond in markdown with:\n\
         1. A short overview of what the data contains\n\
         2. Notable patterns, trends or outliers\n\
         3. Data quality issues worth fixing\n\
         4. Suggested next questions\n\
         Use markdown tables where they help.",
        context
    )
}

/// Question prompt including the running conversation.
pub fn chat_prompt(context: &str, history: &[ChatMessage], question: &str) -> String {
    let mut out = format!(
        "You are a helpful data analyst answering questions about this dataset.\n\n{}\n",
        context
    );
    let turns: Vec<String> = history
        .iter()
        .filter(|m| !m.is_error)
        .map(|m| {
            let speaker = match m.role {
                ChatRole::User => "User",
                ChatRole::Assistant => "Assistant",
            };
            format!("{}: {}", speaker, m.content)
        })
        .collect();
    if !turns.is_empty() {
        out.push_str("Conversation so far:\n");
        out.push_str(&turns.join("\n"));
        out.push_str("\n\n");
    }
    out.push_str(&format!(
        "Question: {}\nAnswer in markdown. Present tabular results as markdown tables.",
        question
    ));
    out
}

pub fn chart_suggestion_prompt(context: &str) -> String {
    format!(
        "Suggest up to 3 charts for the dataset below.\n\n{}\n\
         Reply with only a JSON array. Each element has the fields \
         \"type\" (bar, line, area, pie, scatter or histogram), \"title\", \
         \"xAxis\", optionally \"yAxis\", and optionally \"aggregation\" \
         (sum, avg, count, min or max). Use column names exactly as listed.",
        context
    )
}

/// Parse chart suggestions from a model reply, tolerating a fenced code
/// block and skipping entries that do not describe a valid chart.
pub fn parse_chart_suggestions(reply: &str) -> Vec<ChartConfig> {
    let body = JSON_FENCE
        .captures(reply)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(reply)
        .trim();

    let Ok(serde_json::Value::Array(items)) = serde_json::from_str(body) else {
        tracing::warn!("Chart suggestion reply is not a JSON array");
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<ChartConfig>(item).ok())
        .filter(|config| config.x_axis.is_some())
        .collect()
}
