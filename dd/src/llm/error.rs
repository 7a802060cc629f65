//! LLM error types

use thiserror::Error;

/// Errors that can occur during completion calls
///
/// Every variant degrades into a stage fallback at the planner/generator
/// boundary; callers above those stages never see these.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = LlmError::ApiError {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "API error 502: bad gateway");
    }

    #[test]
    fn test_invalid_response_display() {
        let err = LlmError::InvalidResponse("no choices".to_string());
        assert!(err.to_string().contains("no choices"));
    }
}
