use farm_types::RecordId;

/// Errors from document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Insert of a document whose id is already taken.
    #[error("duplicate document id in {collection}: {id}")]
    DuplicateId {
        collection: &'static str,
        id: RecordId,
    },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A writer panicked while holding the collection lock.
    #[error("collection lock poisoned: {0}")]
    LockPoisoned(&'static str),
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
