// src/render/html.rs
use crate::extractors::models::{Context, ContextValue};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

static ORDERED_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.").expect("valid ordered item regex"));

const METRICS_STYLE: &str = r#"
    <style>
    .metrics-container {
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
        max-width: 800px;
        margin: 20px auto;
        padding: 20px;
    }
    .metrics-header {
        color: #2c3e50;
        font-size: 1.5rem;
        font-weight: 600;
        margin-bottom: 20px;
        border-bottom: 2px solid #3498db;
        padding-bottom: 10px;
    }
    .metrics-grid {
        display: grid;
        grid-template-columns: repeat(auto-fit, minmax(250px, 1fr));
        gap: 16px;
        margin-top: 15px;
    }
    .metric-card {
        background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
        border-radius: 12px;
        padding: 20px;
        color: white;
        box-shadow: 0 4px 15px rgba(102, 126, 234, 0.4);
        transition: transform 0.3s ease, box-shadow 0.3s ease;
    }
    .metric-card:hover {
        transform: translateY(-5px);
        box-shadow: 0 8px 25px rgba(102, 126, 234, 0.6);
    }
    .metric-label {
        font-size: 0.9rem;
        font-weight: 500;
        opacity: 0.9;
        margin-bottom: 8px;
        text-transform: uppercase;
        letter-spacing: 0.5px;
    }
    .metric-value {
        font-size: 1.8rem;
        font-weight: 700;
        line-height: 1.2;
    }
    .no-metrics {
        text-align: center;
        padding: 40px;
        color: #7f8c8d;
        font-style: italic;
    }
    </style>
"#;

const CONTEXT_STYLE: &str = r#"
    <style>
    .context-container {
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
        max-width: 900px;
        margin: 20px auto;
        padding: 20px;
        background: #f8f9fa;
        border-radius: 12px;
        box-shadow: 0 2px 10px rgba(0,0,0,0.1);
    }
    .context-header {
        color: #2c3e50;
        font-size: 1.5rem;
        font-weight: 600;
        margin-bottom: 25px;
        border-bottom: 3px solid #e74c3c;
        padding-bottom: 10px;
    }
    .context-section {
        margin-bottom: 25px;
        background: white;
        border-radius: 8px;
        padding: 20px;
        border-left: 4px solid #3498db;
        box-shadow: 0 2px 5px rgba(0,0,0,0.05);
    }
    .section-title {
        color: #e74c3c;
        font-size: 1.1rem;
        font-weight: 600;
        margin-bottom: 12px;
        text-transform: uppercase;
        letter-spacing: 0.5px;
    }
    .section-content {
        color: #2c3e50;
        line-height: 1.6;
        font-size: 0.95rem;
    }
    .context-list {
        margin: 10px 0;
        padding-left: 0;
    }
    .context-list li {
        list-style: none;
        padding: 8px 0;
        border-bottom: 1px solid #ecf0f1;
        position: relative;
        padding-left: 20px;
    }
    .context-list li:before {
        content: "▸";
        color: #3498db;
        font-weight: bold;
        position: absolute;
        left: 0;
    }
    .context-list li:last-child {
        border-bottom: none;
    }
    .no-context {
        text-align: center;
        padding: 40px;
        color: #7f8c8d;
        font-style: italic;
    }
    </style>
"#;

/// Escapes text for inclusion in HTML element content.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Renders the metrics mapping as a grid of cards.
pub fn metrics_html(metrics: &IndexMap<String, String>) -> String {
    if metrics.is_empty() {
        return r#"<div class="no-metrics"><p>No financial metrics available.</p></div>"#.to_string();
    }

    let mut html = String::from(METRICS_STYLE);
    html.push_str("\n    <div class=\"metrics-container\">\n");
    html.push_str("        <div class=\"metrics-header\">Financial Metrics</div>\n");
    html.push_str("        <div class=\"metrics-grid\">\n");

    for (metric, value) in metrics {
        html.push_str(&format!(
            "        <div class=\"metric-card\">\n            <div class=\"metric-label\">{}</div>\n            <div class=\"metric-value\">{}</div>\n        </div>\n",
            escape_html(metric),
            escape_html(value)
        ));
    }

    html.push_str("        </div>\n    </div>\n");
    html
}

/// Renders the context mapping, one section per non-empty entry.
pub fn context_html(context: &Context) -> String {
    if context.is_empty() {
        return r#"<div class="no-context"><p>No context available.</p></div>"#.to_string();
    }

    let mut html = String::from(CONTEXT_STYLE);
    html.push_str("\n    <div class=\"context-container\">\n");
    html.push_str("        <div class=\"context-header\">Business Analysis Context</div>\n");

    for (section_key, section_value) in context {
        if section_value.is_empty() {
            continue;
        }

        html.push_str(&format!(
            "        <div class=\"context-section\">\n            <div class=\"section-title\">{}</div>\n            <div class=\"section-content\">\n",
            escape_html(&section_key.replace('_', " "))
        ));

        match section_value {
            ContextValue::Text(text) => html.push_str(&format_text_content(text)),
            ContextValue::List(items) => {
                html.push_str("<ul class=\"context-list\">");
                for item in items {
                    html.push_str(&format!("<li>{}</li>", escape_html(item)));
                }
                html.push_str("</ul>");
            }
            ContextValue::Nested(map) => {
                for (sub_key, sub_value) in map {
                    html.push_str(&format!(
                        "<p><strong>{}:</strong> {}</p>",
                        escape_html(sub_key),
                        escape_html(sub_value)
                    ));
                }
            }
        }

        html.push_str("\n            </div>\n        </div>\n");
    }

    html.push_str("</div>");
    html
}

#[derive(Clone, Copy, PartialEq)]
enum OpenList {
    None,
    Unordered,
    Ordered,
}

fn close_list(parts: &mut Vec<String>, open: &mut OpenList) {
    match open {
        OpenList::Unordered => parts.push("</ul>".to_string()),
        OpenList::Ordered => parts.push("</ol>".to_string()),
        OpenList::None => {}
    }
    *open = OpenList::None;
}

/// Markdown-ish text to HTML: `###`/`####` headings, `- ` and `1.` lists, paragraphs.
pub fn format_text_content(text: &str) -> String {
    if text.trim().is_empty() {
        return "<p>No content available.</p>".to_string();
    }

    let mut parts: Vec<String> = Vec::new();
    let mut open = OpenList::None;

    for line in text.trim().lines() {
        let line = line.trim();

        if line.is_empty() {
            close_list(&mut parts, &mut open);
            continue;
        }

        if let Some(item) = line.strip_prefix("- ") {
            if open != OpenList::Unordered {
                close_list(&mut parts, &mut open);
                parts.push("<ul class=\"context-list\">".to_string());
                open = OpenList::Unordered;
            }
            parts.push(format!("<li>{}</li>", escape_html(item.trim())));
            continue;
        }

        if ORDERED_ITEM_RE.is_match(line) {
            if open != OpenList::Ordered {
                close_list(&mut parts, &mut open);
                parts.push("<ol class=\"context-list\">".to_string());
                open = OpenList::Ordered;
            }
            let item = line.split_once('.').map(|(_, rest)| rest).unwrap_or_default();
            parts.push(format!("<li>{}</li>", escape_html(item.trim())));
            continue;
        }

        close_list(&mut parts, &mut open);
        if let Some(heading) = line.strip_prefix("### ") {
            parts.push(format!("<h4>{}</h4>", escape_html(heading.trim())));
        } else if let Some(heading) = line.strip_prefix("#### ") {
            parts.push(format!("<h5>{}</h5>", escape_html(heading.trim())));
        } else {
            parts.push(format!("<p>{}</p>", escape_html(line)));
        }
    }

    close_list(&mut parts, &mut open);
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_inputs_render_placeholders() {
        assert!(metrics_html(&IndexMap::new()).contains("No financial metrics available."));
        assert!(context_html(&Context::new()).contains("No context available."));
        assert_eq!(format_text_content("   "), "<p>No content available.</p>");
    }

    #[test]
    fn metrics_render_one_card_each() {
        let metrics = IndexMap::from([
            ("Revenue".to_string(), "$1098.7 million".to_string()),
            ("Gross Profit Margin".to_string(), "30.04%".to_string()),
        ]);
        let html = metrics_html(&metrics);
        assert_eq!(html.matches("class=\"metric-card\"").count(), 2);
        assert!(html.contains("<div class=\"metric-value\">$1098.7 million</div>"));
        assert!(html.find("Revenue").unwrap() < html.find("Gross Profit Margin").unwrap());
    }

    #[test]
    fn context_sections_render_by_shape() {
        let mut context = Context::new();
        context.insert("market_outlook".into(), ContextValue::Text("- Growth\n- Risk".into()));
        context.insert("Drivers".into(), ContextValue::List(vec!["Price".into()]));
        context.insert(
            "Segments".into(),
            ContextValue::Nested(IndexMap::from([("Retail".to_string(), "60%".to_string())])),
        );
        context.insert("Empty".into(), ContextValue::Text(String::new()));

        let html = context_html(&context);
        assert!(html.contains("<div class=\"section-title\">market outlook</div>"));
        assert!(html.contains("<ul class=\"context-list\">\n<li>Growth</li>\n<li>Risk</li>\n</ul>"));
        assert!(html.contains("<ul class=\"context-list\"><li>Price</li></ul>"));
        assert!(html.contains("<p><strong>Retail:</strong> 60%</p>"));
        assert!(!html.contains(">Empty<"));
        assert_eq!(html.matches("class=\"context-section\"").count(), 3);
    }

    #[test]
    fn text_content_headings_and_lists() {
        let text = "### Summary\nSolid year.\n1. First\n2. Second\n\n#### Detail\n- a\n- b";
        assert_eq!(
            format_text_content(text),
            "<h4>Summary</h4>\n<p>Solid year.</p>\n<ol class=\"context-list\">\n<li>First</li>\n<li>Second</li>\n</ol>\n\
             <h5>Detail</h5>\n<ul class=\"context-list\">\n<li>a</li>\n<li>b</li>\n</ul>"
        );
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(format_text_content("a < b & c"), "<p>a &lt; b &amp; c</p>");
        let metrics = IndexMap::from([("<x>".to_string(), "1".to_string())]);
        assert!(metrics_html(&metrics).contains("&lt;x&gt;"));
    }
}
