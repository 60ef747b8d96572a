// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error {status}: {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Model call timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Model returned no content")]
    EmptyResponse,

    #[error("Failed to parse model reply: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model client misconfigured: {0}")]
    Config(String),
}

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Record is not valid JSON or a dict literal: {0}")]
    Malformed(String),

    #[error("Record has unexpected shape: {0}")]
    Shape(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Model interaction failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
