//! Error handling for Segmix
//!
//! All failures are file-scoped: the batch runner logs them and moves on to
//! the next file. Only batch-level setup (input directory unreadable, output
//! root unwritable) aborts a whole run. A file excluded by a duration gate is
//! not an error at all; see [`crate::ops::Skip`].

use thiserror::Error;

/// Result type alias for Segmix operations
pub type Result<T> = std::result::Result<T, SegmixError>;

/// Main error type for Segmix operations
#[derive(Error, Debug)]
pub enum SegmixError {
    // Parameter Errors
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    // File Errors
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    // External Tool Errors
    #[error("{tool} failed: {reason}")]
    ExternalTool { tool: &'static str, reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SegmixError {
    /// Shorthand for an `InvalidArgument` error
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        SegmixError::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            SegmixError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            SegmixError::FileNotFound { .. } => "FILE_NOT_FOUND",
            SegmixError::InvalidAudio { .. } => "INVALID_AUDIO",
            SegmixError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            SegmixError::ExternalTool { .. } => "EXTERNAL_TOOL_FAILURE",
            SegmixError::Io(_) => "IO_ERROR",
        }
    }
}
