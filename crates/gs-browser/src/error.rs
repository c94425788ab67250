//! Error types for gs-browser

use thiserror::Error;

/// gs-browser error type
#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Browser initialization failed: {0}")]
    Initialization(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Interaction failed: {0}")]
    Interaction(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Tab error: {0}")]
    TabError(String),

    #[error("Screen document error: {0}")]
    Screen(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, BrowserError>;

/// Any browser failure surfaces to the kiosk loop as a lost session
impl From<BrowserError> for gs_core::Error {
    fn from(e: BrowserError) -> Self {
        gs_core::Error::Session(e.to_string())
    }
}
