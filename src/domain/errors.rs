//! Domain errors for the escalation engine.
//!
//! The engine itself never fails; these cover malformed input at the edges.

use thiserror::Error;

/// Domain-level errors raised while interpreting caller input.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Unknown message source: {0}. Must be one of: system, boss, family, agile, manual")]
    UnknownSource(String),

    #[error("Message text cannot be empty")]
    EmptyText,

    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
