//! # Crate Error Types
//!
//! Top-level error type for operations that can legitimately fail outside of the
//! question-answering path: bootstrapping, configuration, and the table browser.
//! The workflow itself never returns these from `ask`; stage failures are folded
//! into the response instead.

use crate::config::ConfigurationError;
use crate::database::GatewayError;
use crate::llm::ProviderError;
use crate::orchestration::StateMachineError;

#[derive(Debug, thiserror::Error)]
pub enum AnalystError {
    #[error("Configuration error: {0}")]
    ConfigurationError(#[from] ConfigurationError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] GatewayError),

    #[error("Provider error: {0}")]
    ProviderError(#[from] ProviderError),

    #[error("State transition error: {0}")]
    StateTransitionError(#[from] StateMachineError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalystError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

pub type Result<T> = std::result::Result<T, AnalystError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_converts() {
        let err: AnalystError = GatewayError::not_found("orders").into();
        assert!(matches!(err, AnalystError::DatabaseError(_)));
        assert_eq!(err.to_string(), "Database error: Table not found: orders");
    }

    #[test]
    fn test_validation_message() {
        let err = AnalystError::validation("question must not be empty");
        assert_eq!(
            err.to_string(),
            "Validation error: question must not be empty"
        );
    }
}
