use std::collections::BTreeMap;
use std::sync::RwLock;

use farm_types::RecordId;

use crate::error::{StoreError, StoreResult};
use crate::traits::{Document, DocumentStore};

/// In-memory, map-backed document store.
///
/// Intended for tests and embedding. Documents are held behind a `RwLock`
/// and cloned on read/write.
pub struct InMemoryStore<D: Document> {
    docs: RwLock<BTreeMap<RecordId, D>>,
}

impl<D: Document> InMemoryStore<D> {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(BTreeMap::new()),
        }
    }

    fn len(&self) -> usize {
        self.docs.read().map(|m| m.len()).unwrap_or(0)
    }

    fn read_lock(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, BTreeMap<RecordId, D>>> {
        self.docs
            .read()
            .map_err(|_| StoreError::LockPoisoned(D::COLLECTION))
    }

    fn write_lock(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, BTreeMap<RecordId, D>>> {
        self.docs
            .write()
            .map_err(|_| StoreError::LockPoisoned(D::COLLECTION))
    }
}

impl<D: Document> Default for InMemoryStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Document> DocumentStore<D> for InMemoryStore<D> {
    fn get(&self, id: &RecordId) -> StoreResult<Option<D>> {
        Ok(self.read_lock()?.get(id).cloned())
    }

    fn find_one(&self, predicate: &dyn Fn(&D) -> bool) -> StoreResult<Option<D>> {
        Ok(self.read_lock()?.values().find(|d| predicate(d)).cloned())
    }

    fn list(&self) -> StoreResult<Vec<D>> {
        Ok(self.read_lock()?.values().cloned().collect())
    }

    fn insert(&self, doc: &D) -> StoreResult<()> {
        let mut map = self.write_lock()?;
        let id = doc.id();
        if map.contains_key(&id) {
            return Err(StoreError::DuplicateId {
                collection: D::COLLECTION,
                id,
            });
        }
        map.insert(id, doc.clone());
        Ok(())
    }

    fn save(&self, doc: &D) -> StoreResult<()> {
        self.write_lock()?.insert(doc.id(), doc.clone());
        Ok(())
    }

    fn delete(&self, id: &RecordId) -> StoreResult<bool> {
        Ok(self.write_lock()?.remove(id).is_some())
    }

    fn count(&self) -> StoreResult<usize> {
        Ok(self.read_lock()?.len())
    }
}

impl<D: Document> std::fmt::Debug for InMemoryStore<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("collection", &D::COLLECTION)
            .field("document_count", &self.len())
            .finish()
    }
}
