//! Error types for depot.
//!
//! Uses thiserror for derive macros. Every variant maps onto an exit code so
//! the CLI can report failures without inspecting message text.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for depot operations.
#[derive(Error, Debug)]
pub enum DepotError {
    /// Malformed request, inventory, or configuration. Raised before any task exists.
    #[error("{0}")]
    UserError(String),

    /// Pre-flight validation found descriptors the catalog does not carry.
    #[error("unsupported request: {}", .0.join("; "))]
    ValidationError(Vec<String>),

    /// The catalog document could not be loaded.
    #[error("catalog error: {0}")]
    CatalogError(String),

    /// A fetch, removal, or playbook run failed.
    #[error("{0}")]
    ActionError(String),

    /// A task record could not be persisted, read, or evicted.
    #[error("task store error: {0}")]
    StoreError(String),
}

impl DepotError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            DepotError::UserError(_) => exit_codes::USER_ERROR,
            DepotError::ValidationError(_) => exit_codes::VALIDATION_FAILURE,
            DepotError::CatalogError(_) => exit_codes::CATALOG_FAILURE,
            DepotError::ActionError(_) => exit_codes::ACTION_FAILURE,
            DepotError::StoreError(_) => exit_codes::STORE_FAILURE,
        }
    }
}

/// Result type alias for depot operations.
pub type Result<T> = std::result::Result<T, DepotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_error_has_correct_exit_code() {
        let err = DepotError::UserError("missing mode".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn validation_error_has_correct_exit_code() {
        let err = DepotError::ValidationError(vec!["kubectl".to_string()]);
        assert_eq!(err.exit_code(), exit_codes::VALIDATION_FAILURE);
    }

    #[test]
    fn store_error_has_correct_exit_code() {
        let err = DepotError::StoreError("disk full".to_string());
        assert_eq!(err.exit_code(), exit_codes::STORE_FAILURE);
    }

    #[test]
    fn action_error_message_is_passed_through_verbatim() {
        let err = DepotError::ActionError("connection refused".to_string());
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(err.exit_code(), exit_codes::ACTION_FAILURE);
    }

    #[test]
    fn validation_error_joins_descriptors() {
        let err = DepotError::ValidationError(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(err.to_string(), "unsupported request: a; b");
    }
}
