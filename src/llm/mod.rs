// src/llm/mod.rs
pub mod client;
pub mod models;

use crate::utils::error::LlmError;
use async_trait::async_trait;

pub use client::OpenAiClient;
pub use models::{CompletionRequest, ExtractedData, FinancialMetrics};

/// A language-model service that answers one structured-output request.
///
/// Returns the reply message content, expected to be a JSON object matching
/// `request.schema`. Validation of that content is the caller's concern.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}
