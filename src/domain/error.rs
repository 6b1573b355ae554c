//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent business rule violations on already-fetched data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },

    #[error("amount out of range: {0}")]
    AmountOverflow(String),

    #[error("member {requester} may not view the pyramid of {requested}")]
    Forbidden { requester: String, requested: String },

    #[error("view '{0}' requires an admin session")]
    AdminRequired(String),
}
