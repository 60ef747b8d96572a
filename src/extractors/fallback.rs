// src/extractors/fallback.rs

// --- Imports ---
use crate::extractors::models::ExtractionResult;
use crate::extractors::record::{DetailedOutcome, ResponseRecord};
use once_cell::sync::Lazy;
use regex::Regex;

// --- Constants ---
const FINANCIAL_METRICS_SECTION: &str = "Financial Metrics";
const COMPETITOR_SECTION: &str = "Competitor Analysis";
const CONTRADICTIONS_SECTION: &str = "Contradictory Analysis";

/// How a captured number is written back into the metrics map.
#[derive(Debug, Clone, Copy, PartialEq)]
enum MetricUnit {
    Millions, // "$<v> million"
    Percent,  // "<v>%"
    Ratio,    // "<v>"
}

impl MetricUnit {
    fn format(self, value: &str) -> String {
        match self {
            MetricUnit::Millions => format!("${} million", value),
            MetricUnit::Percent => format!("{}%", value),
            MetricUnit::Ratio => value.to_string(),
        }
    }
}

// --- Regex Patterns (Lazy Static) ---
// Display key, unit, pattern. Each pattern's first capture group is the value.
static METRIC_PATTERNS: Lazy<Vec<(&'static str, MetricUnit, Regex)>> = Lazy::new(|| {
    [
        ("Revenue", MetricUnit::Millions, r"(?i)\$?([\d,\.]+)\s*million"),
        ("Gross Profit Margin", MetricUnit::Percent, r"(?i)Gross Profit Margin.*?([\d\.]+)%"),
        ("Net Profit Margin", MetricUnit::Percent, r"(?i)Net Profit Margin.*?([\d\.]+)%"),
        ("Debt To Equity Ratio", MetricUnit::Ratio, r"(?i)Debt to Equity Ratio.*?([\d\.]+)"),
        ("Total Debt Ratio", MetricUnit::Ratio, r"(?i)Total Debt Ratio.*?([\d\.]+)"),
    ]
    .into_iter()
    .filter_map(|(name, unit, pat)| Regex::new(pat).ok().map(|re| (name, unit, re)))
    .collect()
});

/// Deterministic extraction used when the structured path is unavailable.
///
/// Never touches the network and never fails: every field defaults to empty.
pub fn fallback_extraction(record: &ResponseRecord) -> ExtractionResult {
    let mut result = ExtractionResult {
        additional_context: record.additional_context.clone(),
        ..Default::default()
    };

    let sections = match &record.detailed_outcome {
        DetailedOutcome::Sections(sections) => sections,
        DetailedOutcome::Text(_) => {
            tracing::debug!("Detailed outcome is plain text; fallback has no sections to read");
            return result;
        }
    };

    result.context = sections.clone();

    if let Some(financial) = sections.get(FINANCIAL_METRICS_SECTION) {
        let financial_text = financial.to_string();
        for (name, unit, re) in METRIC_PATTERNS.iter() {
            if let Some(value) = re.captures(&financial_text).and_then(|caps| caps.get(1)) {
                tracing::trace!("Fallback matched {} = {}", name, value.as_str());
                result.metrics.insert(name.to_string(), unit.format(value.as_str()));
            }
        }
    }

    result.competitor = sections
        .get(COMPETITOR_SECTION)
        .map(|v| v.to_string())
        .unwrap_or_default();
    result.contradictions = sections
        .get(CONTRADICTIONS_SECTION)
        .map(|v| v.to_string())
        .unwrap_or_default();

    tracing::debug!("Fallback extraction found {} metrics", result.metrics.len());
    result
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::models::ContextValue;
    use crate::extractors::record::{ADDITIONAL_CONTEXT_KEY, DETAILED_OUTCOME_KEY};
    use serde_json::json;

    fn record_with_metrics(text: &str) -> ResponseRecord {
        serde_json::from_value(json!({
            DETAILED_OUTCOME_KEY: {
                "Financial Metrics": text,
                "Competitor Analysis": "Rival Corp is bigger.",
                "Contradictory Analysis": "Margins disagree with filings."
            },
            ADDITIONAL_CONTEXT_KEY: "See appendix."
        }))
        .unwrap()
    }

    #[test]
    fn extracts_revenue_in_millions() {
        let result = fallback_extraction(&record_with_metrics("Revenue of $1098.7 million"));
        assert_eq!(result.metrics.get("Revenue").map(String::as_str), Some("$1098.7 million"));
    }

    #[test]
    fn extracts_margins_and_ratios() {
        let text = "Revenue: 2,000 million. gross profit margin was 30.04%; \
                    Net Profit Margin: 0.43%. Debt to equity ratio of 3.44 and total debt ratio 1.00";
        let result = fallback_extraction(&record_with_metrics(text));

        let metrics: Vec<(&str, &str)> =
            result.metrics.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(
            metrics,
            vec![
                ("Revenue", "$2,000 million"),
                ("Gross Profit Margin", "30.04%"),
                ("Net Profit Margin", "0.43%"),
                ("Debt To Equity Ratio", "3.44"),
                ("Total Debt Ratio", "1.00"),
            ]
        );
    }

    #[test]
    fn copies_sections_into_result() {
        let record = record_with_metrics("nothing numeric");
        let result = fallback_extraction(&record);

        assert!(result.metrics.is_empty());
        assert_eq!(result.competitor, "Rival Corp is bigger.");
        assert_eq!(result.contradictions, "Margins disagree with filings.");
        assert_eq!(result.additional_context, "See appendix.");
        assert_eq!(
            result.context.get("Financial Metrics"),
            Some(&ContextValue::Text("nothing numeric".into()))
        );
        assert_eq!(result.context.len(), 3);
    }

    #[test]
    fn absent_sections_default_to_empty() {
        let record: ResponseRecord =
            serde_json::from_value(json!({ DETAILED_OUTCOME_KEY: { "Overview": "ok" } })).unwrap();
        let result = fallback_extraction(&record);
        assert!(result.metrics.is_empty());
        assert_eq!(result.competitor, "");
        assert_eq!(result.contradictions, "");
        assert_eq!(result.context.len(), 1);
    }

    #[test]
    fn plain_text_outcome_yields_empty_context() {
        let record = ResponseRecord {
            detailed_outcome: DetailedOutcome::Text("Revenue of $5 million".into()),
            additional_context: "extra".into(),
            ..Default::default()
        };
        let result = fallback_extraction(&record);
        assert_eq!(
            result,
            ExtractionResult { additional_context: "extra".into(), ..Default::default() }
        );
    }
}
