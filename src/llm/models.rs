// src/llm/models.rs
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One structured-output call, independent of the provider's wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    /// JSON Schema the reply content must satisfy
    pub schema: serde_json::Value,
    pub schema_name: String,
    pub temperature: f32,
}

// --- Response schema ---

/// Headline metrics requested from the model. Values are short display strings, not floats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FinancialMetrics {
    /// Company revenue (e.g., '$1098.7 million')
    pub revenue: Option<String>,
    /// Gross profit margin percentage (e.g., '30.04%')
    pub gross_profit_margin: Option<String>,
    /// Net profit margin percentage (e.g., '0.43%')
    pub net_profit_margin: Option<String>,
    /// Debt to equity ratio (e.g., '3.44')
    pub debt_to_equity_ratio: Option<String>,
    /// Total debt ratio (e.g., '1.00')
    pub total_debt_ratio: Option<String>,
    /// Current ratio if available
    pub current_ratio: Option<String>,
    /// Return on equity if available
    pub return_on_equity: Option<String>,
    /// Return on assets if available
    pub return_on_assets: Option<String>,
}

impl FinancialMetrics {
    /// Machine-style field names with their values, in schema order.
    pub fn entries(&self) -> [(&'static str, Option<&str>); 8] {
        [
            ("revenue", self.revenue.as_deref()),
            ("gross_profit_margin", self.gross_profit_margin.as_deref()),
            ("net_profit_margin", self.net_profit_margin.as_deref()),
            ("debt_to_equity_ratio", self.debt_to_equity_ratio.as_deref()),
            ("total_debt_ratio", self.total_debt_ratio.as_deref()),
            ("current_ratio", self.current_ratio.as_deref()),
            ("return_on_equity", self.return_on_equity.as_deref()),
            ("return_on_assets", self.return_on_assets.as_deref()),
        ]
    }
}

/// Complete structure for extracted business analysis data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedData {
    /// Financial metrics extracted from the analysis
    #[serde(default)]
    pub metrics: FinancialMetrics,
    /// Contextual information and company insights
    #[serde(default)]
    #[schemars(with = "std::collections::HashMap<String, serde_json::Value>")]
    pub context: serde_json::Map<String, serde_json::Value>,
    /// Competitor analysis and market landscape information
    #[serde(default)]
    pub competitor: String,
    /// Any contradictions, validation needs, or analytical gaps identified
    #[serde(default)]
    pub contradictions: String,
    /// Additional context or recommendations
    #[serde(default)]
    pub additional_context: String,
}

impl ExtractedData {
    pub const SCHEMA_NAME: &'static str = "ExtractedData";

    pub fn json_schema() -> serde_json::Value {
        let schema = schemars::schema_for!(ExtractedData);
        serde_json::to_value(schema).unwrap_or_default()
    }
}

// --- Chat completions wire format ---

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub response_format: ResponseFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: Some(content.into()) }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: Some(content.into()) }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
    pub json_schema: JsonSchemaFormat,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonSchemaFormat {
    pub name: String,
    pub strict: bool,
    pub schema: serde_json::Value,
}

impl From<&CompletionRequest> for ChatRequest {
    fn from(request: &CompletionRequest) -> Self {
        Self {
            model: request.model.clone(),
            messages: vec![
                ChatMessage::system(request.system.clone()),
                ChatMessage::user(request.user.clone()),
            ],
            temperature: request.temperature,
            response_format: ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: JsonSchemaFormat {
                    name: request.schema_name.clone(),
                    // context is an open mapping, which strict mode rejects
                    strict: false,
                    schema: request.schema.clone(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}
