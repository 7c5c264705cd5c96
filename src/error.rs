//! Error types for Tubescribe.

use thiserror::Error;

/// Library-level error type for Tubescribe operations.
#[derive(Error, Debug)]
pub enum TubescribeError {
    #[error("Invalid video reference: {0}")]
    InvalidReference(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Captions unavailable: {0}")]
    CaptionUnavailable(String),

    #[error("{service} is unavailable: {detail}")]
    ServiceUnavailable {
        service: String,
        detail: String,
        hint: String,
    },

    #[error("Generation failed: {0}")]
    GenerationFailure(String),

    #[error("Transcription service error: {0}")]
    DelegateFailure(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Coarse category an error falls into when reported to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The caller sent something unusable.
    ClientInput,
    /// The requested resource does not exist upstream.
    NotFound,
    /// A backend we depend on is not reachable.
    BackendUnavailable,
    /// A backend answered, but with a failure.
    Upstream,
    /// An outbound call exceeded its time budget.
    Timeout,
    /// The caller went away.
    Cancelled,
    /// Anything else.
    Internal,
}

impl TubescribeError {
    /// Short, stable summary suitable for the `error` field of a response.
    pub fn summary(&self) -> &'static str {
        match self {
            TubescribeError::InvalidReference(_) => "Invalid YouTube URL",
            TubescribeError::Validation(_) => "Invalid request",
            TubescribeError::CaptionUnavailable(_) => "No captions available for this video",
            TubescribeError::ServiceUnavailable { .. } => "Service unavailable",
            TubescribeError::GenerationFailure(_) => "Failed to generate response",
            TubescribeError::DelegateFailure(_) => "Transcription service failed",
            TubescribeError::Timeout(_) => "Upstream request timed out",
            TubescribeError::Cancelled(_) => "Request cancelled",
            _ => "Internal error",
        }
    }

    /// Detail message, if the error carries one.
    pub fn details(&self) -> Option<String> {
        match self {
            TubescribeError::InvalidReference(d)
            | TubescribeError::Validation(d)
            | TubescribeError::CaptionUnavailable(d)
            | TubescribeError::GenerationFailure(d)
            | TubescribeError::DelegateFailure(d)
            | TubescribeError::Timeout(d)
            | TubescribeError::Cancelled(d) => Some(d.clone()),
            TubescribeError::ServiceUnavailable { detail, .. } => Some(detail.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Remediation hint for operators.
    pub fn hint(&self) -> Option<&str> {
        match self {
            TubescribeError::ServiceUnavailable { hint, .. } => Some(hint),
            TubescribeError::ToolNotFound(_) => Some("Run 'tubescribe doctor' for diagnostics"),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            TubescribeError::InvalidReference(_) | TubescribeError::Validation(_) => {
                ErrorCategory::ClientInput
            }
            TubescribeError::CaptionUnavailable(_) => ErrorCategory::NotFound,
            TubescribeError::ServiceUnavailable { .. } => ErrorCategory::BackendUnavailable,
            TubescribeError::GenerationFailure(_) | TubescribeError::DelegateFailure(_) => {
                ErrorCategory::Upstream
            }
            TubescribeError::Timeout(_) => ErrorCategory::Timeout,
            TubescribeError::Cancelled(_) => ErrorCategory::Cancelled,
            _ => ErrorCategory::Internal,
        }
    }
}

/// Result type alias for Tubescribe operations.
pub type Result<T> = std::result::Result<T, TubescribeError>;
