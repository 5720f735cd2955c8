//! Errors raised while building or parsing catalog values.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Rejected input, before anything reaches storage.
///
/// Storage failures live in the infrastructure layer and never show up here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A payload field broke a product rule.
    #[error("{field} is invalid: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Not a usable product identifier (unparsable, or the nil UUID).
    #[error("invalid product id: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
