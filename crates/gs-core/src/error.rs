//! Error types for gs-core

use thiserror::Error;

/// Main error type for gs-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM API error: {0}")]
    LlmApi(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed extractor response: {0}")]
    Parse(String),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Browser session error: {0}")]
    Session(String),

    #[error("Menu reference error: {0}")]
    Menu(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for gs-core
pub type Result<T> = std::result::Result<T, Error>;
