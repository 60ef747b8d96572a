// src/extractors/prompts.rs

pub const EXTRACTION_SYSTEM_PROMPT: &str = "\
You are a financial analyst assistant. You read business analysis reports and \
return their key facts as structured data.

Rules:
- Only report figures that appear in the text. Never estimate or invent values.
- Keep metric values short and human readable, with units: '$1098.7 million', '30.04%', '3.44'.
- Leave a metric null when the text does not state it.
- `context` maps a short section name to a string, a list of strings, or a flat mapping of strings.
- `competitor` summarises competitor and market landscape information.
- `contradictions` lists contradictions, validation needs or analytical gaps.
- `additional_context` holds remaining recommendations or caveats.";

const EXTRACTION_USER_PROMPT: &str = "\
Extract the financial metrics and supporting insights from the analysis below.

{input_text}";

/// Fills the user prompt template with the flattened record.
pub fn extraction_user_prompt(input_text: &str) -> String {
    EXTRACTION_USER_PROMPT.replace("{input_text}", input_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_prompt_embeds_input() {
        let prompt = extraction_user_prompt("SUMMARY: ok");
        assert!(prompt.ends_with("\n\nSUMMARY: ok"));
        assert!(!prompt.contains("{input_text}"));
    }
}
