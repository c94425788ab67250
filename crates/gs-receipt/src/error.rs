//! Error types for gs-receipt

use std::path::PathBuf;

use thiserror::Error;

/// gs-receipt error type
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Receipt template not found: {}", .0.display())]
    TemplateMissing(PathBuf),

    #[error("Font error: {0}")]
    Font(String),

    #[error("Invalid layout: {0}")]
    Layout(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, RenderError>;
