use farm_store::StoreError;

/// Errors produced by ledger operations.
///
/// `Validation` and `NotFound` carry a message meant for the end user.
/// `Persistence` wraps the store failure, which callers should log rather
/// than show.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Persistence(#[from] StoreError),

    #[error("write lock poisoned for key {0}")]
    LockPoisoned(String),
}

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
