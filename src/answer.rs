//! Prompt assembly and oracle delegation.
//!
//! The generator sends two messages: a fixed system instruction asking for a bare answer, and a
//! user message carrying the question plus a textual summary of any extracted data. Tabular data
//! is summarized (shape, column names, a five-row sample, and the first `answer` value when that
//! column exists); text uploads are forwarded in full.

use crate::config::{Config, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use crate::extract::{ANSWER_COLUMN, Dataset, ExtractedData};
use crate::oracle::{ChatMessage, CompletionClient, CompletionRequest, OracleError};
use std::fmt::Write as _;
use std::sync::Arc;

/// Instruction framing every completion.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant for the Tools in Data Science course. \
Answer questions directly and concisely, providing only the exact answer that should be entered \
in the assignment.";

/// Number of leading rows included in a table summary.
pub const SAMPLE_ROWS: usize = 5;

/// Model parameters fixed for the lifetime of a generator.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerSettings {
    /// Model identifier sent with every request.
    pub model: String,
    /// Sampling temperature; kept low for repeatable answers.
    pub temperature: f32,
}

impl Default for AnswerSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl From<&Config> for AnswerSettings {
    fn from(config: &Config) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }
}

/// Builds prompts and asks the completion oracle for an answer.
#[derive(Clone)]
pub struct AnswerGenerator {
    client: Arc<dyn CompletionClient>,
    settings: AnswerSettings,
}

impl AnswerGenerator {
    /// Create a generator around an oracle client.
    pub fn new(client: Arc<dyn CompletionClient>, settings: AnswerSettings) -> Self {
        Self { client, settings }
    }

    /// Settings applied to every request.
    pub fn settings(&self) -> &AnswerSettings {
        &self.settings
    }

    /// Ask the oracle to answer `question`, optionally grounded in extracted `data`.
    ///
    /// The returned text is trimmed of surrounding whitespace.
    pub async fn answer(&self, question: &str, data: &ExtractedData) -> Result<String, OracleError> {
        let request = self.build_request(question, data);
        tracing::debug!(
            model = %request.model,
            data = data.kind(),
            prompt_chars = request.messages.iter().map(|m| m.content.len()).sum::<usize>(),
            "Calling completion oracle"
        );
        let completion = self.client.complete(request).await?;
        Ok(completion.trim().to_string())
    }

    /// Assemble the completion request without sending it.
    pub fn build_request(&self, question: &str, data: &ExtractedData) -> CompletionRequest {
        CompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(user_prompt(question, data)),
            ],
            temperature: self.settings.temperature,
        }
    }
}

/// User message body: the question, then the data summary when present.
pub fn user_prompt(question: &str, data: &ExtractedData) -> String {
    match summarize(data) {
        Some(summary) => format!("Question: {question}\n\n{summary}"),
        None => format!("Question: {question}"),
    }
}

/// Text describing extracted data, or `None` when nothing was extracted.
pub fn summarize(data: &ExtractedData) -> Option<String> {
    match data {
        ExtractedData::Table(dataset) => Some(summarize_table(dataset)),
        ExtractedData::Text(text) => Some(format!("File content:\n{text}")),
        ExtractedData::Absent => None,
    }
}

fn summarize_table(dataset: &Dataset) -> String {
    let (rows, columns) = dataset.shape();
    let mut summary = format!(
        "DataFrame Information:\nShape: ({rows}, {columns})\nColumns: {}\n",
        dataset.columns().join(", ")
    );
    summary.push_str("Sample Data:\n");
    summary.push_str(&render_sample(dataset, SAMPLE_ROWS));

    if let Some(value) = dataset.answer_value() {
        let _ = write!(summary, "\n\nValue in '{ANSWER_COLUMN}' column: {value}");
    }
    summary
}

/// Right-aligned text table of the first `limit` rows, prefixed with a row index.
fn render_sample(dataset: &Dataset, limit: usize) -> String {
    let sample = &dataset.rows()[..dataset.rows().len().min(limit)];
    if sample.is_empty() {
        return format!(
            "Empty DataFrame\nColumns: [{}]\nIndex: []",
            dataset.columns().join(", ")
        );
    }

    let index_width = (sample.len() - 1).to_string().len();
    let widths: Vec<usize> = dataset
        .columns()
        .iter()
        .enumerate()
        .map(|(col, name)| {
            sample
                .iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = " ".repeat(index_width);
    for (name, &width) in dataset.columns().iter().zip(&widths) {
        let _ = write!(out, "  {name:>width$}");
    }
    for (index, row) in sample.iter().enumerate() {
        let _ = write!(out, "\n{index:<index_width$}");
        for (col, &width) in widths.iter().enumerate() {
            let cell = row.get(col).map(String::as_str).unwrap_or("");
            let _ = write!(out, "  {cell:>width$}");
        }
    }
    out
}
