use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Engine-level error type.
///
/// The three kinds matter to callers in different ways: `InvalidInput` is the
/// caller's problem and still yields a usable (minimal) report wherever the
/// engine can degrade instead; `Config` and `Invariant` are fatal and must
/// never be presented as a score.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invariant violation: {0}")]
    Invariant(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl EngineError {
    /// Process exit code for the CLI: 1 = malformed input, 2 = engine bug or
    /// bad configuration.
    pub fn exit_code(&self) -> i32 {
        match self {
            EngineError::InvalidInput(_) | EngineError::NotFound(_) => 1,
            EngineError::Config(_) | EngineError::Invariant(_) | EngineError::Internal(_) => 2,
        }
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            EngineError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone())
            }
            EngineError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            EngineError::Config(msg) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIG_ERROR",
                    "The scoring engine is misconfigured".to_string(),
                )
            }
            EngineError::Invariant(msg) => {
                tracing::error!("Invariant violation: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INVARIANT_VIOLATION",
                    "An internal scoring invariant was violated".to_string(),
                )
            }
            EngineError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_exits_one() {
        assert_eq!(EngineError::InvalidInput("bad".into()).exit_code(), 1);
    }

    #[test]
    fn test_config_and_invariant_exit_two() {
        assert_eq!(EngineError::Config("no weights".into()).exit_code(), 2);
        assert_eq!(EngineError::Invariant("score 999".into()).exit_code(), 2);
    }
}
