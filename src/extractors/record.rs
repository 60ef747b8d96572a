// src/extractors/record.rs

// --- Imports ---
use crate::extractors::models::{value_text, Context, ContextValue};
use crate::utils::error::RecordError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// --- Constants ---
pub const SHORT_OUTCOME_KEY: &str = "1. Task outcome (short version)";
pub const DETAILED_OUTCOME_KEY: &str = "2. Task outcome (extremely detailed version)";
pub const ADDITIONAL_CONTEXT_KEY: &str = "3. Additional context (if relevant)";

// Preamble some agents put in front of the serialized record
const AGENT_PREAMBLE: &str = "Here is the final answer from your managed agent 'None':";

// --- Data Structures ---
/// Section 2 of a record: usually a mapping of named subsections, sometimes plain prose.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DetailedOutcome {
    Sections(Context),
    Text(String),
}

impl Default for DetailedOutcome {
    fn default() -> Self {
        DetailedOutcome::Sections(Context::new())
    }
}

impl DetailedOutcome {
    pub fn sections(&self) -> Option<&Context> {
        match self {
            DetailedOutcome::Sections(sections) => Some(sections),
            DetailedOutcome::Text(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            DetailedOutcome::Sections(sections) => sections.is_empty(),
            DetailedOutcome::Text(text) => text.is_empty(),
        }
    }
}

impl<'de> Deserialize<'de> for DetailedOutcome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Object(map) => DetailedOutcome::Sections(
                map.into_iter().map(|(k, v)| (k, ContextValue::from(v))).collect(),
            ),
            Value::Null => DetailedOutcome::default(),
            other => DetailedOutcome::Text(value_text(&other)),
        })
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Value::deserialize(deserializer).map(|v| value_text(&v))
}

/// An agent's unstructured answer, keyed by the three fixed section titles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    #[serde(rename = "1. Task outcome (short version)", default, deserialize_with = "lenient_text")]
    pub short_outcome: String,

    #[serde(rename = "2. Task outcome (extremely detailed version)", default)]
    pub detailed_outcome: DetailedOutcome,

    #[serde(rename = "3. Additional context (if relevant)", default, deserialize_with = "lenient_text")]
    pub additional_context: String,
}

impl ResponseRecord {
    /// Flattens the record into the prompt body.
    ///
    /// Order is fixed: summary, then each detailed subsection as `key: value`,
    /// then additional context. Parts are separated by a blank line.
    pub fn prepare_input_text(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if !self.short_outcome.is_empty() {
            parts.push(format!("SUMMARY: {}", self.short_outcome));
        }

        if !self.detailed_outcome.is_empty() {
            parts.push("DETAILED ANALYSIS:".to_string());
            match &self.detailed_outcome {
                DetailedOutcome::Sections(sections) => {
                    parts.extend(sections.iter().map(|(key, value)| format!("{}: {}", key, value)));
                }
                DetailedOutcome::Text(text) => parts.push(text.clone()),
            }
        }

        if !self.additional_context.is_empty() {
            parts.push(format!("ADDITIONAL CONTEXT: {}", self.additional_context));
        }

        parts.join("\n\n")
    }

    /// Parses a serialized record (JSON, or a Python dict literal), dropping any agent preamble.
    /// Failures are logged and yield `None`.
    pub fn parse_serialized(input: &str) -> Option<Self> {
        match Self::try_parse_serialized(input) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::error!("Error converting string to record: {}", e);
                None
            }
        }
    }

    pub fn try_parse_serialized(input: &str) -> Result<Self, RecordError> {
        let cleaned = input.replace(AGENT_PREAMBLE, "");
        let cleaned = cleaned.trim();

        let value: Value = match serde_json::from_str(cleaned) {
            Ok(value) => value,
            Err(json_err) => {
                tracing::debug!("Record is not JSON ({}), trying dict literal", json_err);
                let converted = python_literal_to_json(cleaned)?;
                serde_json::from_str(&converted)
                    .map_err(|e| RecordError::Malformed(e.to_string()))?
            }
        };

        if !value.is_object() {
            return Err(RecordError::Malformed(format!(
                "expected a mapping at top level, found {}",
                value_kind(&value)
            )));
        }

        Ok(serde_json::from_value(value)?)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

// --- Dict Literal Conversion ---
/// Rewrites a Python literal (quoted strings, `True`/`False`/`None`, tuples,
/// trailing commas) as JSON text.
fn python_literal_to_json(input: &str) -> Result<String, RecordError> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                out.push('"');
                let mut closed = false;
                while let Some(s) = chars.next() {
                    match s {
                        '\\' => match chars.next() {
                            Some('\'') => out.push('\''),
                            Some(escaped) => {
                                out.push('\\');
                                out.push(escaped);
                            }
                            None => return Err(RecordError::Malformed("dangling escape".into())),
                        },
                        q if q == c => {
                            closed = true;
                            break;
                        }
                        '"' => out.push_str("\\\""),
                        '\n' => out.push_str("\\n"),
                        '\t' => out.push_str("\\t"),
                        '\r' => out.push_str("\\r"),
                        other => out.push(other),
                    }
                }
                if !closed {
                    return Err(RecordError::Malformed("unterminated string".into()));
                }
                out.push('"');
            }
            '(' => out.push('['),
            ')' | ']' | '}' => {
                // Python allows a trailing comma before a closer
                let trimmed_len = out.trim_end().len();
                out.truncate(trimmed_len);
                if out.ends_with(',') {
                    out.pop();
                }
                out.push(if c == ')' { ']' } else { c });
            }
            // exponent marker inside a number literal
            'e' | 'E' if out.ends_with(|p: char| p.is_ascii_digit() || p == '.') => out.push(c),
            c if c.is_alphabetic() || c == '_' => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_alphanumeric() || next == '_' {
                        word.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match word.as_str() {
                    "True" => out.push_str("true"),
                    "False" => out.push_str("false"),
                    "None" => out.push_str("null"),
                    other => {
                        return Err(RecordError::Malformed(format!("unexpected identifier '{}'", other)))
                    }
                }
            }
            other => out.push(other),
        }
    }

    Ok(out)
}
