//! Error types for the metamodel transformation

use thiserror::Error;

use crate::graph::Diagnostics;

/// Result type for transformation operations
pub type Result<T> = std::result::Result<T, TransformError>;

/// Transformation errors
///
/// Unsupported constructs never surface here; they are skipped and recorded
/// as diagnostics. Anything in this enum aborts the whole resource.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Internal invariant violated for {classifier}: {message}")]
    Invariant { classifier: String, message: String },

    #[error("Metamodel rejected with {} error(s):\n{0}", .0.error_count())]
    Rejected(Diagnostics),

    #[error("Invalid multiplicity: {0}")]
    InvalidMultiplicity(String),

    #[error("Failed to parse metamodel {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Name pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Input path error: {0}")]
    StripPrefix(#[from] std::path::StripPrefixError),
}

impl TransformError {
    /// Build an invariant violation for a classifier
    pub fn invariant(classifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invariant {
            classifier: classifier.into(),
            message: message.into(),
        }
    }
}
