//! Error types for chatread.
//!
//! One enum covers every failure the retrieve-then-generate flow can surface:
//! configuration, I/O, the completion service, the search service, prompt
//! rendering and malformed requests.

use thiserror::Error;

/// Unified error type for chatread.
///
/// Every library function returns `Result<T, AppError>`. Service failures are
/// fatal to the current request; nothing is retried here.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Completion service errors (transport, status, decode, empty choices)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Search service errors
    #[error("Search error: {0}")]
    Search(String),

    /// Template loading and rendering errors, including malformed overrides
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// The request itself is unusable (e.g. empty history)
    #[error("Invalid request: {0}")]
    Request(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_failing_service() {
        let err = AppError::Search("index not found".to_string());
        assert_eq!(err.to_string(), "Search error: index not found");

        let err = AppError::Llm("429 Too Many Requests".to_string());
        assert!(err.to_string().starts_with("LLM error"));
    }

    #[test]
    fn test_json_error_converts_to_serialization() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: AppError = parse.unwrap_err().into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
