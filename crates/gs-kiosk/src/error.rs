//! Error types for gs-kiosk

use std::fmt;

/// Kiosk error taxonomy
///
/// Startup and browser failures end the process; everything else belongs
/// to a single order and is logged before polling resumes.
#[derive(Debug)]
pub enum KioskError {
    /// Configuration, credentials or assets missing or malformed
    ConfigMissing(String),
    /// The browser session is gone or unusable
    BrowserSession(String),
    /// The completion API call failed
    ExtractionFailed(String),
    /// The completion API answered without the expected fields
    ParseFailed(String),
    /// The receipt could not be drawn
    RenderFailed(String),
    /// No backend printed the receipt
    PrintFailed(String),
}

impl KioskError {
    /// Whether the polling loop must stop
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ConfigMissing(_) | Self::BrowserSession(_))
    }
}

impl fmt::Display for KioskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigMissing(e) => write!(f, "Configuration error: {}", e),
            Self::BrowserSession(e) => write!(f, "Browser session failure: {}", e),
            Self::ExtractionFailed(e) => write!(f, "Extraction failed: {}", e),
            Self::ParseFailed(e) => write!(f, "Parse failed: {}", e),
            Self::RenderFailed(e) => write!(f, "Render failed: {}", e),
            Self::PrintFailed(e) => write!(f, "Print failed: {}", e),
        }
    }
}

impl std::error::Error for KioskError {}

impl From<gs_core::Error> for KioskError {
    fn from(e: gs_core::Error) -> Self {
        use gs_core::Error;

        match e {
            Error::Config(_) | Error::Menu(_) => Self::ConfigMissing(e.to_string()),
            Error::Session(_) => Self::BrowserSession(e.to_string()),
            Error::Parse(_) | Error::InvalidOrder(_) => Self::ParseFailed(e.to_string()),
            Error::LlmApi(_) | Error::Http(_) | Error::Json(_) | Error::Io(_) => {
                Self::ExtractionFailed(e.to_string())
            }
        }
    }
}

impl From<gs_browser::BrowserError> for KioskError {
    fn from(e: gs_browser::BrowserError) -> Self {
        Self::BrowserSession(e.to_string())
    }
}

impl From<gs_receipt::RenderError> for KioskError {
    fn from(e: gs_receipt::RenderError) -> Self {
        Self::RenderFailed(e.to_string())
    }
}

impl From<gs_printer::PrintError> for KioskError {
    fn from(e: gs_printer::PrintError) -> Self {
        Self::PrintFailed(e.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, KioskError>;
