//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the tree contract.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("invalid tree at node '{label}': {reason}")]
    InvalidTree { label: String, reason: String },

    #[error("cannot parse tree: {message}")]
    Parse { message: String },

    #[error("unknown direction: {0} (expected none, ltr or rtl)")]
    UnknownDirection(String),

    #[error("unknown role: {0} (expected max or min)")]
    UnknownRole(String),

    #[error("unknown tree format: {0} (expected auto, expr or json)")]
    UnknownFormat(String),

    #[error("node missing from annotated tree: {0}")]
    MissingNode(String),
}

impl DomainError {
    pub fn invalid_tree(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTree {
            label: label.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
