//! Error types for scenejson-export.
//!
//! Encoding itself cannot fail; only writing the document can.

use thiserror::Error;

/// Result type for writer operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Errors that can occur while writing a document.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
