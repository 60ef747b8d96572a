// src/extractors/models.rs
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Section name to section body, in source order.
pub type Context = IndexMap<String, ContextValue>;

/// Shape of a context section, decided once when the record is read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContextValue {
    Text(String),
    List(Vec<String>),
    Nested(IndexMap<String, String>),
}

impl ContextValue {
    pub fn is_empty(&self) -> bool {
        match self {
            ContextValue::Text(text) => text.is_empty(),
            ContextValue::List(items) => items.is_empty(),
            ContextValue::Nested(map) => map.is_empty(),
        }
    }
}

/// Renders a JSON scalar or container as plain text. Strings are unquoted.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl From<Value> for ContextValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => ContextValue::Text(s),
            Value::Array(items) => ContextValue::List(items.iter().map(value_text).collect()),
            Value::Object(map) => {
                ContextValue::Nested(map.iter().map(|(k, v)| (k.clone(), value_text(v))).collect())
            }
            other => ContextValue::Text(value_text(&other)),
        }
    }
}

impl<'de> Deserialize<'de> for ContextValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(ContextValue::from)
    }
}

impl fmt::Display for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Text(text) => f.write_str(text),
            ContextValue::List(items) => write!(f, "[{}]", items.join(", ")),
            ContextValue::Nested(map) => {
                let pairs: Vec<String> = map.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", pairs.join(", "))
            }
        }
    }
}

/// Unified output of the structured and fallback extraction paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Display-cased metric name (e.g. "Gross Profit Margin") to value.
    #[serde(default)]
    pub metrics: IndexMap<String, String>,
    #[serde(default)]
    pub context: Context,
    #[serde(default)]
    pub competitor: String,
    #[serde(default)]
    pub contradictions: String,
    #[serde(default)]
    pub additional_context: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn context_values_resolve_by_shape() {
        let context: Context = serde_json::from_value(json!({
            "Overview": "Solid year",
            "Risks": ["FX", 3, null],
            "Segments": { "Retail": "60%", "Online": 40 },
            "Employees": 1200
        }))
        .unwrap();

        assert_eq!(context["Overview"], ContextValue::Text("Solid year".into()));
        assert_eq!(
            context["Risks"],
            ContextValue::List(vec!["FX".into(), "3".into(), String::new()])
        );
        match &context["Segments"] {
            ContextValue::Nested(map) => {
                assert_eq!(map["Retail"], "60%");
                assert_eq!(map["Online"], "40");
            }
            other => panic!("expected nested map, got {:?}", other),
        }
        assert_eq!(context["Employees"], ContextValue::Text("1200".into()));
        // source order is kept
        assert_eq!(context.keys().next().map(String::as_str), Some("Overview"));
    }

    #[test]
    fn display_renders_containers_inline() {
        assert_eq!(ContextValue::List(vec!["a".into(), "b".into()]).to_string(), "[a, b]");
        let nested = ContextValue::Nested(IndexMap::from([("k".to_string(), "v".to_string())]));
        assert_eq!(nested.to_string(), "{k: v}");
    }

    #[test]
    fn result_serializes_context_untagged() {
        let mut result = ExtractionResult::default();
        result.context.insert("Notes".into(), ContextValue::List(vec!["one".into()]));
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["context"]["Notes"], json!(["one"]));

        let back: ExtractionResult = serde_json::from_value(value).unwrap();
        assert_eq!(back, result);
    }
}
