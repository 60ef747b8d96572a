// src/metrics/numeric.rs

const CURRENCY_MARKERS: [char; 4] = ['$', '€', '£', '¥'];

/// Parses a noisy numeric cell into a float.
///
/// Cells like `"Level 2 & 1,234.5"` carry a tag before an ampersand; only the
/// segment after it is considered. Thousands separators and currency markers
/// are dropped. Anything that still isn't a number yields `None`, never zero.
pub fn normalize_number(raw: &str) -> Option<f64> {
    let candidate = if raw.contains('&') {
        // Segment between the first and any second ampersand
        raw.split('&').nth(1)?
    } else {
        raw
    };

    let cleaned: String = candidate
        .chars()
        .filter(|c| *c != ',' && !CURRENCY_MARKERS.contains(c))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    match cleaned.parse::<f64>() {
        Ok(value) if !value.is_nan() => Some(value),
        Ok(_) => None,
        Err(e) => {
            tracing::trace!("Unparseable numeric value '{}': {}", raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_thousands_separators() {
        assert_eq!(normalize_number("1,234.5"), Some(1234.5));
        assert_eq!(normalize_number("12,345,678"), Some(12_345_678.0));
    }

    #[test]
    fn takes_segment_after_ampersand() {
        assert_eq!(normalize_number("Level 2 & 5,000"), Some(5000.0));
        assert_eq!(normalize_number("Level 2 & 1,234.5"), Some(1234.5));
        assert_eq!(normalize_number("a & 7 & 9"), Some(7.0));
    }

    #[test]
    fn dangling_ampersand_is_missing() {
        assert_eq!(normalize_number("Level 2 &"), None);
        assert_eq!(normalize_number("&"), None);
    }

    #[test]
    fn garbage_is_missing() {
        assert_eq!(normalize_number("N/A"), None);
        assert_eq!(normalize_number(""), None);
        assert_eq!(normalize_number("  "), None);
        assert_eq!(normalize_number("--"), None);
        assert_eq!(normalize_number("NaN"), None);
    }

    #[test]
    fn handles_currency_and_whitespace() {
        assert_eq!(normalize_number("$1,000,000"), Some(1_000_000.0));
        assert_eq!(normalize_number("  42.0 "), Some(42.0));
        assert_eq!(normalize_number("-$3.5"), Some(-3.5));
        assert_eq!(normalize_number("€ 12"), Some(12.0));
    }

    #[test]
    fn stringified_output_reparses_to_same_value() {
        for raw in ["1,234.5", "$1,000,000", "Level 2 & 0.25", "-17"] {
            let first = normalize_number(raw).unwrap();
            assert_eq!(normalize_number(&first.to_string()), Some(first));
        }
    }
}
