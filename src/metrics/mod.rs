// src/metrics/mod.rs
pub mod numeric;
pub mod table;

// Re-export key table-metric types for convenience
pub use numeric::normalize_number;
pub use table::{
    canonical_keys,
    extract_table_metrics,
    FinancialTables,
    MetricsMap,
    Table,
    TableRow,
};
