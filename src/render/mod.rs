// src/render/mod.rs
pub mod html;

pub use html::{context_html, format_text_content, metrics_html};
