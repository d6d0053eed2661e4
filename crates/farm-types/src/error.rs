use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid record id: {0}")]
    InvalidId(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),
}
