//! Error types for image editing operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for image editing operations
pub type Result<T> = std::result::Result<T, ImageMillError>;

/// Error types for image editing operations
#[derive(Error, Debug)]
pub enum ImageMillError {
    /// Input/output errors (permission denied, disk full, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Decode/encode errors reported by the image codecs
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Input file does not exist
    #[error("File not found: {0}")]
    InputNotFound(PathBuf),

    /// Detected format is outside the supported set (JPEG/PNG/GIF)
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Operation requires a populated handle but none is present
    #[error("Image not loaded: {0}")]
    NotLoaded(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Backend transform or codec call reported failure
    #[error("Processing error: {0}")]
    Processing(String),

    /// External command-line tool failed (non-zero exit, timeout, missing binary)
    #[error("External tool error: {0}")]
    ExternalTool(String),
}

impl ImageMillError {
    /// Create a new input-not-found error
    pub fn input_not_found<P: Into<PathBuf>>(path: P) -> Self {
        Self::InputNotFound(path.into())
    }

    /// Create a new unsupported format error
    pub fn unsupported_format<S: Into<String>>(format: S) -> Self {
        Self::UnsupportedFormat(format.into())
    }

    /// Create a new not-loaded error naming the rejected operation
    pub fn not_loaded<S: Into<String>>(operation: S) -> Self {
        Self::NotLoaded(operation.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new processing error
    pub fn processing<S: Into<String>>(msg: S) -> Self {
        Self::Processing(msg.into())
    }

    /// Create a new external tool error
    pub fn external_tool<S: Into<String>>(msg: S) -> Self {
        Self::ExternalTool(msg.into())
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }
}
