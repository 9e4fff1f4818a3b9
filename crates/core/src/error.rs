//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business failures (validation, missing
/// resources, conflicts). Transport/status mapping belongs to the API layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. non-positive amount).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested resource was not found, or exists but the caller may not
    /// see it. The two cases are deliberately indistinguishable.
    #[error("not found")]
    NotFound,

    /// A debit would take an account balance below zero.
    #[error("not enough balance")]
    InsufficientFunds,

    /// Credential or re-authentication failure.
    #[error("unauthorized")]
    Unauthorized,

    /// A uniqueness or state conflict (duplicate email/phone, non-ACTIVE
    /// account).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Breach callers cannot repair (poisoned lock, signing failure).
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
