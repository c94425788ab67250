//! Error types for gs-printer

use thiserror::Error;

/// gs-printer error type
#[derive(Error, Debug)]
pub enum PrintError {
    /// The backend cannot reach a printer; nothing was sent
    #[error("Printer unavailable: {0}")]
    Unavailable(String),

    /// A job was started and did not complete
    #[error("Print failed: {0}")]
    Failed(String),

    #[error("Unknown print backend: {0}")]
    UnknownBackend(String),

    /// The bitmap cannot be encoded for the printer
    #[error("Invalid print job: {0}")]
    Job(#[from] gs_receipt::RenderError),
}

impl PrintError {
    /// Whether the dispatcher may move on to the next backend
    pub fn is_unavailable(&self) -> bool {
        matches!(self, PrintError::Unavailable(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PrintError>;
