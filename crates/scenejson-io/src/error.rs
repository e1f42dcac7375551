//! Import errors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImportError>;

/// Why a model could not be turned into a scene.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Neither the extension nor the content matched a registered reader.
    #[error("unknown format: {0}")]
    UnknownFormat(String),

    /// Malformed container structure, e.g. a broken GLB header.
    #[error("parse error: {message}{}", .offset.map(|o| format!(" at byte {}", o)).unwrap_or_default())]
    ParseError {
        message: String,
        offset: Option<usize>,
    },

    /// Well-formed input describing an impossible scene: indices out of
    /// range, cyclic node graphs and the like.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The reader produced a scene with dangling references.
    #[error("invalid data: {0}")]
    InvalidScene(#[from] scenejson_core::ValidationError),

    #[error("missing required: {0}")]
    MissingRequired(String),

    /// A version, extension or primitive mode this importer cannot handle.
    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl ImportError {
    pub fn parse_at(message: impl Into<String>, offset: usize) -> Self {
        Self::ParseError {
            message: message.into(),
            offset: Some(offset),
        }
    }
}
