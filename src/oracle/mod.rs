//! Completion oracle abstraction.
//!
//! The answer pipeline only needs one capability from a language model: turn a list of
//! role-tagged messages into a single completion. [`CompletionClient`] captures that so the
//! HTTP-backed client can be swapped for a test double.

mod openai;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use openai::OpenAiCompletionClient;

/// Errors surfaced while requesting a completion.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The service could not be reached (DNS, TLS, connection reset, timeout).
    #[error("Completion service unavailable: {0}")]
    Unavailable(String),
    /// The service answered with a non-success status (auth, quota, rate limit, bad request).
    #[error("Completion service returned status {status}")]
    Rejected {
        /// HTTP status code returned by the service.
        status: u16,
        /// Response body, typically a JSON error envelope. Logged, never shown to callers.
        body: String,
    },
    /// The response could not be decoded or carried no completion text.
    #[error("Malformed completion response: {0}")]
    InvalidResponse(String),
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions framing the conversation.
    System,
    /// End-user content.
    User,
}

/// One role-tagged message sent to the oracle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    /// Who authored the message.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// System instruction message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// User message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Request payload passed to the completion oracle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    /// Model identifier understood by the provider.
    pub model: String,
    /// Conversation to complete.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Interface implemented by completion providers.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Produce the completion text for `request`.
    async fn complete(&self, request: CompletionRequest) -> Result<String, OracleError>;
}
