// src/extractors/mod.rs
pub mod fallback;
pub mod models;
pub mod prompts;
pub mod record;
pub mod structured;

// Re-export key extraction types for convenience
pub use fallback::fallback_extraction;
pub use models::{Context, ContextValue, ExtractionResult};
pub use record::{DetailedOutcome, ResponseRecord};
pub use structured::{display_key, StructuredExtractor};
