// src/extractors/structured.rs

// --- Imports ---
use crate::extractors::fallback::fallback_extraction;
use crate::extractors::models::{ContextValue, ExtractionResult};
use crate::extractors::prompts::{extraction_user_prompt, EXTRACTION_SYSTEM_PROMPT};
use crate::extractors::record::ResponseRecord;
use crate::llm::models::{CompletionRequest, ExtractedData};
use crate::llm::CompletionService;
use crate::utils::error::LlmError;
use std::time::Duration;

// --- Constants ---
// Low temperature for consistent extraction
pub const EXTRACTION_TEMPERATURE: f32 = 0.1;

// --- Main Extractor Structure ---
/// Model-backed extraction with a deterministic regex fallback.
pub struct StructuredExtractor<S> {
    service: S,
    model: String,
    temperature: f32,
    timeout: Option<Duration>,
}

impl<S: CompletionService> StructuredExtractor<S> {
    pub fn new(service: S, model: impl Into<String>) -> Self {
        Self {
            service,
            model: model.into(),
            temperature: EXTRACTION_TEMPERATURE,
            timeout: None,
        }
    }

    /// Bounds the model call; an expired call counts as a failure and falls back.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn build_request(&self, record: &ResponseRecord) -> CompletionRequest {
        let input_text = record.prepare_input_text();
        CompletionRequest {
            model: self.model.clone(),
            system: EXTRACTION_SYSTEM_PROMPT.to_string(),
            user: extraction_user_prompt(&input_text),
            schema: ExtractedData::json_schema(),
            schema_name: ExtractedData::SCHEMA_NAME.to_string(),
            temperature: self.temperature,
        }
    }

    /// Extracts metrics and insights, falling back to regex extraction on any failure.
    ///
    /// The caller only ever sees a result; the failure is logged.
    pub async fn extract(&self, record: &ResponseRecord) -> ExtractionResult {
        match self.try_extract(record).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Error in LLM extraction, using fallback: {}", e);
                fallback_extraction(record)
            }
        }
    }

    /// The structured path alone: call the model and validate its reply against the schema.
    pub async fn try_extract(&self, record: &ResponseRecord) -> Result<ExtractionResult, LlmError> {
        let request = self.build_request(record);
        tracing::debug!("Prompt body is {} bytes", request.user.len());

        let content = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.service.complete(&request))
                .await
                .map_err(|_| LlmError::Timeout(limit))??,
            None => self.service.complete(&request).await?,
        };

        let extracted: ExtractedData = serde_json::from_str(&content)?;
        let result = into_result(extracted);
        tracing::info!("Structured extraction returned {} metrics", result.metrics.len());
        Ok(result)
    }
}

/// Converts a validated model reply into the unified result shape.
pub fn into_result(data: ExtractedData) -> ExtractionResult {
    let metrics = data
        .metrics
        .entries()
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (display_key(key), v.to_string())))
        .collect();

    ExtractionResult {
        metrics,
        context: data
            .context
            .into_iter()
            .map(|(k, v)| (k, ContextValue::from(v)))
            .collect(),
        competitor: data.competitor,
        contradictions: data.contradictions,
        additional_context: data.additional_context,
    }
}

/// `gross_profit_margin` -> `Gross Profit Margin`: underscores become spaces and
/// each word is capitalised with the rest lower-cased.
pub fn display_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut prev_cased = false;
    for c in key.chars() {
        if c == '_' {
            out.push(' ');
            prev_cased = false;
        } else if c.is_alphabetic() {
            if prev_cased {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_cased = true;
        } else {
            out.push(c);
            prev_cased = false;
        }
    }
    out
}
