use farm_types::RecordId;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreResult;

/// A top-level record that can live in a collection.
pub trait Document: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection name, used for file names and log fields.
    const COLLECTION: &'static str;

    fn id(&self) -> RecordId;
}

/// Collection of whole documents.
///
/// Implementations must satisfy these invariants:
/// - `save` is an upsert that replaces the stored document atomically.
/// - `list` returns documents ordered by id.
/// - Reads never observe a half-written document.
pub trait DocumentStore<D: Document>: Send + Sync {
    /// Read a document by id. Returns `Ok(None)` if it does not exist.
    fn get(&self, id: &RecordId) -> StoreResult<Option<D>>;

    /// First document (in id order) matching the predicate.
    fn find_one(&self, predicate: &dyn Fn(&D) -> bool) -> StoreResult<Option<D>>;

    /// Every document in the collection.
    fn list(&self) -> StoreResult<Vec<D>>;

    /// Store a new document. Fails if the id is already present.
    fn insert(&self, doc: &D) -> StoreResult<()>;

    /// Insert or replace a document.
    fn save(&self, doc: &D) -> StoreResult<()>;

    /// Delete by id. Returns `true` if the document existed.
    fn delete(&self, id: &RecordId) -> StoreResult<bool>;

    /// Number of stored documents.
    fn count(&self) -> StoreResult<usize> {
        Ok(self.list()?.len())
    }
}
