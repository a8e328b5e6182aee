//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// state membership, malformed record values). Transport and storage failures
/// belong to the gateway layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. an empty required field).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A status value outside the recognized set.
    #[error("invalid state: '{0}' (expected one of: available, on hold, sold)")]
    InvalidState(String),

    /// A sortable field holds a value that cannot be compared as expected.
    #[error("malformed field '{field}' on item {item}: {detail}")]
    MalformedField {
        field: &'static str,
        item: String,
        detail: String,
    },

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_state(value: impl Into<String>) -> Self {
        Self::InvalidState(value.into())
    }

    pub fn malformed(field: &'static str, item: impl ToString, detail: impl Into<String>) -> Self {
        Self::MalformedField {
            field,
            item: item.to_string(),
            detail: detail.into(),
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
