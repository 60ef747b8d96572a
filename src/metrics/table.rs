// src/metrics/table.rs

// --- Imports ---
use crate::metrics::numeric::normalize_number;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

// --- Types ---
/// One table row: cell 0 is the label, cell 2 the value. Other cells are ignored.
pub type TableRow = Vec<String>;
pub type Table = Vec<TableRow>;

/// Ordered `(label substring, canonical key)` rules. First match wins per row;
/// a rule listed after a shorter substring of itself is unreachable.
pub type MatchRules = &'static [(&'static str, &'static str)];

// --- Rule Tables ---
pub const LIQUIDITY_RULES: MatchRules = &[
    ("total identifiable intangible assets", "total_identifiable_intangible_assets"),
    ("trade names", "trade_names"),
    ("developed technology", "developed_technology"),
    ("customer relationships", "customer_relationships"),
];

pub const BALANCE_SHEET_RULES: MatchRules = &[
    ("total current assets", "current_assets"),
    ("total assets", "total_assets"),
    ("total current liabilities", "current_liabilities"),
    ("total liabilities", "total_liabilities"),
    ("total stockholders equity", "total_stockholders_equity"),
    ("cash and cash equivalents", "cash_and_cash_equivalents"),
    ("inventories", "inventory"),
    ("accounts receivable", "accounts_receivable"),
    ("accounts payable", "accounts_payable"),
    ("goodwill", "goodwill"),
    ("intangible assets net", "intangible_assets"),
    ("long-term debt net of current portion", "long_term_debt"),
];

// "sales" is checked first and shadows any label that also mentions sales.
pub const INCOME_STATEMENT_RULES: MatchRules = &[
    ("sales", "sales"),
    ("net earnings", "net_earnings"),
    ("basic net earnings per common share", "basic_eps"),
    ("diluted net earnings per common share", "diluted_eps"),
    ("operating earnings", "operating_earnings"),
    ("gross profit", "gross_profit"),
    ("depreciation depletion and amortization", "depreciation_and_amortization"),
];

pub const CASH_FLOW_RULES: MatchRules = &[
    ("net cash provided by operating activities", "net_cash_operating_activities"),
    ("net cash used in investing activities", "net_cash_investing_activities"),
    ("net cash provided by financing activities", "net_cash_financing_activities"),
];

const ALL_RULES: [MatchRules; 4] = [
    LIQUIDITY_RULES,
    BALANCE_SHEET_RULES,
    INCOME_STATEMENT_RULES,
    CASH_FLOW_RULES,
];

/// Every canonical key, in rule declaration order.
pub fn canonical_keys() -> impl Iterator<Item = &'static str> {
    ALL_RULES
        .into_iter()
        .flat_map(|rules| rules.iter().map(|(_, key)| *key))
}

// --- Data Structures ---
/// Canonical metric key to normalized value. `None` means the row was found
/// but its value cell could not be parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsMap {
    values: BTreeMap<&'static str, Option<f64>>,
}

impl MetricsMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &'static str, value: Option<f64>) {
        self.values.insert(key, value);
    }

    /// Whether a row for `key` was seen. Lookup is case-insensitive.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key.to_lowercase().as_str())
    }

    /// Parsed value for `key`, `None` if absent or unparseable. Lookup is case-insensitive.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values
            .get(key.to_lowercase().as_str())
            .copied()
            .flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<f64>)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The four logical tables of a report. Absent tables are skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinancialTables {
    pub liquidity: Option<Table>,
    pub balance_sheet: Option<Table>,
    pub income_statement: Option<Table>,
    pub cash_flow: Option<Table>,
}

impl FinancialTables {
    /// Maps a FINDSum tuple record onto the four tables:
    /// `mda_liquidity_tables[0]` is liquidity, `after_mda_tables[0..3]` are
    /// balance sheet, income statement and cash flow.
    pub fn from_findsum_record(record: &Value) -> Self {
        let liquidity_tables = record.get("mda_liquidity_tables");
        let statement_tables = record.get("after_mda_tables");

        let tables = Self {
            liquidity: table_at(liquidity_tables, 0),
            balance_sheet: table_at(statement_tables, 0),
            income_statement: table_at(statement_tables, 1),
            cash_flow: table_at(statement_tables, 2),
        };
        tracing::debug!(
            "FINDSum record tables present: liquidity={} balance_sheet={} income_statement={} cash_flow={}",
            tables.liquidity.is_some(),
            tables.balance_sheet.is_some(),
            tables.income_statement.is_some(),
            tables.cash_flow.is_some()
        );
        tables
    }
}

fn table_at(tables: Option<&Value>, index: usize) -> Option<Table> {
    let rows = tables?.as_array()?.get(index)?.as_array()?;
    Some(
        rows.iter()
            .filter_map(|row| row.as_array())
            .map(|cells| cells.iter().map(cell_text).collect())
            .collect(),
    )
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// --- Extraction ---
/// Scans every present table against its rule set.
pub fn extract_table_metrics(tables: &FinancialTables) -> MetricsMap {
    let mut metrics = MetricsMap::new();

    let sections: [(&str, Option<&Table>, MatchRules); 4] = [
        ("liquidity", tables.liquidity.as_ref(), LIQUIDITY_RULES),
        ("balance sheet", tables.balance_sheet.as_ref(), BALANCE_SHEET_RULES),
        ("income statement", tables.income_statement.as_ref(), INCOME_STATEMENT_RULES),
        ("cash flow", tables.cash_flow.as_ref(), CASH_FLOW_RULES),
    ];

    for (name, table, rules) in sections {
        match table {
            Some(rows) => scan_table(rows, rules, &mut metrics),
            None => tracing::debug!("No {} table, skipping", name),
        }
    }

    metrics
}

/// Applies `rules` to each row; later rows overwrite earlier ones for the same key.
pub fn scan_table(rows: &[TableRow], rules: MatchRules, metrics: &mut MetricsMap) {
    for row in rows {
        let Some(label) = row.first() else {
            continue;
        };
        let Some(key) = match_label(label, rules) else {
            continue;
        };
        let value = row.get(2).and_then(|cell| normalize_number(cell));
        if value.is_none() {
            tracing::debug!("Row '{}' matched {} but value {:?} is not numeric", label, key, row.get(2));
        }
        metrics.insert(key, value);
    }
}

/// Canonical key of the first rule whose substring occurs in the lower-cased label.
pub fn match_label(label: &str, rules: MatchRules) -> Option<&'static str> {
    let label = label.to_lowercase();
    rules
        .iter()
        .find(|(needle, _)| label.contains(needle))
        .map(|(_, key)| *key)
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(label: &str, value: &str) -> TableRow {
        vec![label.to_string(), String::new(), value.to_string()]
    }

    #[test]
    fn balance_sheet_total_assets() {
        let tables = FinancialTables {
            balance_sheet: Some(vec![row("Total Assets", "$1,000,000")]),
            ..Default::default()
        };
        let metrics = extract_table_metrics(&tables);
        assert_eq!(metrics.get("total_assets"), Some(1_000_000.0));
        assert_eq!(metrics.len(), 1);
    }

    #[test]
    fn unmatched_label_contributes_nothing() {
        let tables = FinancialTables {
            balance_sheet: Some(vec![row("Footnote 3", "12")]),
            cash_flow: Some(vec![row("Footnote 3", "12")]),
            ..Default::default()
        };
        assert!(extract_table_metrics(&tables).is_empty());
    }

    #[test]
    fn matching_is_substring_and_case_insensitive() {
        assert_eq!(match_label("Total Assets (Restated)", BALANCE_SHEET_RULES), Some("total_assets"));
        assert_eq!(match_label("  TRADE NAMES, net", LIQUIDITY_RULES), Some("trade_names"));
    }

    #[test]
    fn first_rule_wins_in_declaration_order() {
        assert_eq!(match_label("Total current assets", BALANCE_SHEET_RULES), Some("current_assets"));
        assert_eq!(match_label("Total current liabilities", BALANCE_SHEET_RULES), Some("current_liabilities"));
        // "sales" shadows the longer income-statement labels that contain it
        assert_eq!(match_label("Net sales", INCOME_STATEMENT_RULES), Some("sales"));
        assert_eq!(match_label("Basic net earnings per common share", INCOME_STATEMENT_RULES), Some("net_earnings"));
    }

    #[test]
    fn unparseable_value_is_recorded_as_missing() {
        let mut metrics = MetricsMap::new();
        scan_table(&[row("Goodwill", "N/A"), vec!["Goodwill".to_string()]], BALANCE_SHEET_RULES, &mut metrics);
        assert!(metrics.contains_key("goodwill"));
        assert_eq!(metrics.get("goodwill"), None);
    }

    #[test]
    fn later_rows_overwrite_earlier_ones() {
        let mut metrics = MetricsMap::new();
        scan_table(&[row("Goodwill", "1"), row("Goodwill", "2")], BALANCE_SHEET_RULES, &mut metrics);
        assert_eq!(metrics.get("GOODWILL"), Some(2.0));
    }

    #[test]
    fn rows_without_label_are_ignored() {
        let mut metrics = MetricsMap::new();
        scan_table(&[vec![]], CASH_FLOW_RULES, &mut metrics);
        assert!(metrics.is_empty());
    }

    #[test]
    fn findsum_record_maps_all_four_tables() {
        let record = json!({
            "mda_liquidity_tables": [[["Customer relationships", "", "Level 3 & 2,500"]]],
            "after_mda_tables": [
                [["Total assets", "", "10,000"], ["Inventories", "", "1,200.5"]],
                [["Gross profit", "", "3,000"]],
                [["Net cash provided by operating activities", "", "800"]]
            ]
        });
        let metrics = extract_table_metrics(&FinancialTables::from_findsum_record(&record));

        assert_eq!(metrics.get("customer_relationships"), Some(2500.0));
        assert_eq!(metrics.get("total_assets"), Some(10_000.0));
        assert_eq!(metrics.get("inventory"), Some(1200.5));
        assert_eq!(metrics.get("gross_profit"), Some(3000.0));
        assert_eq!(metrics.get("net_cash_operating_activities"), Some(800.0));
    }

    #[test]
    fn findsum_record_with_missing_tables_is_not_an_error() {
        let record = json!({ "after_mda_tables": [[["Goodwill", "", 55]]] });
        let tables = FinancialTables::from_findsum_record(&record);
        assert!(tables.liquidity.is_none());
        assert!(tables.income_statement.is_none());
        assert!(tables.cash_flow.is_none());

        let metrics = extract_table_metrics(&tables);
        assert_eq!(metrics.get("goodwill"), Some(55.0));

        assert!(extract_table_metrics(&FinancialTables::from_findsum_record(&json!({}))).is_empty());
    }

    #[test]
    fn table_values_reparse_to_same_float() {
        let tables = FinancialTables {
            income_statement: Some(vec![row("Operating earnings", "12,345.678")]),
            ..Default::default()
        };
        let value = extract_table_metrics(&tables).get("operating_earnings").unwrap();
        assert_eq!(normalize_number(&value.to_string()), Some(value));
    }

    #[test]
    fn canonical_keys_cover_every_rule() {
        let keys: Vec<_> = canonical_keys().collect();
        assert_eq!(keys.len(), 26);
        assert_eq!(keys.first(), Some(&"total_identifiable_intangible_assets"));
        assert_eq!(keys.last(), Some(&"net_cash_financing_activities"));
    }
}
