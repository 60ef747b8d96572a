// src/lib.rs
//! Financial metric extraction for FINDSum-style reports.
//!
//! Two paths produce metrics: a rule-based matcher over labelled statement
//! tables ([`metrics`]) and a model-backed structured extractor with a
//! regex fallback over free-text analyses ([`extractors`]).

pub mod extractors;
pub mod llm;
pub mod metrics;
pub mod render;
pub mod storage;
pub mod utils;

pub use extractors::{fallback_extraction, ExtractionResult, ResponseRecord, StructuredExtractor};
pub use metrics::{extract_table_metrics, normalize_number, FinancialTables, MetricsMap};
pub use utils::AppError;
