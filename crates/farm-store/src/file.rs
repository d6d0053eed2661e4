use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use farm_types::RecordId;
use tempfile::NamedTempFile;

use crate::error::{StoreError, StoreResult};
use crate::traits::{Document, DocumentStore};

/// Document store persisted to `<dir>/<collection>.json`.
///
/// The whole collection is kept in memory and rewritten on every mutation.
/// Each rewrite goes to a temporary file in the same directory which is then
/// renamed over the old file, so a crash leaves either the old or the new
/// collection on disk. The in-memory view is only updated after the rename
/// succeeds.
pub struct JsonFileStore<D: Document> {
    path: PathBuf,
    docs: RwLock<BTreeMap<RecordId, D>>,
}

impl<D: Document> JsonFileStore<D> {
    /// Open (or create) the collection file under `dir`.
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.json", D::COLLECTION));

        let docs = if path.exists() {
            let raw = fs::read(&path)?;
            let list: Vec<D> = serde_json::from_slice(&raw)?;
            list.into_iter().map(|d| (d.id(), d)).collect()
        } else {
            BTreeMap::new()
        };

        tracing::debug!(
            collection = D::COLLECTION,
            path = %path.display(),
            documents = docs.len(),
            "opened json collection"
        );

        Ok(Self {
            path,
            docs: RwLock::new(docs),
        })
    }

    #[cfg(test)]
    fn path(&self) -> &Path {
        &self.path
    }

    fn read_lock(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, BTreeMap<RecordId, D>>> {
        self.docs
            .read()
            .map_err(|_| StoreError::LockPoisoned(D::COLLECTION))
    }

    /// Apply `change` to a copy of the collection, persist it, then publish it.
    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut BTreeMap<RecordId, D>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut map = self
            .docs
            .write()
            .map_err(|_| StoreError::LockPoisoned(D::COLLECTION))?;
        let mut next = map.clone();
        let out = change(&mut next)?;
        self.persist(&next)?;
        *map = next;
        Ok(out)
    }

    fn persist(&self, docs: &BTreeMap<RecordId, D>) -> StoreResult<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let list: Vec<&D> = docs.values().collect();
        let bytes = serde_json::to_vec_pretty(&list)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl<D: Document> DocumentStore<D> for JsonFileStore<D> {
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
        self.mutate(|map| {
            let id = doc.id();
            if map.contains_key(&id) {
                return Err(StoreError::DuplicateId {
                    collection: D::COLLECTION,
                    id,
                });
            }
            map.insert(id, doc.clone());
            Ok(())
        })
    }

    fn save(&self, doc: &D) -> StoreResult<()> {
        self.mutate(|map| {
            map.insert(doc.id(), doc.clone());
            Ok(())
        })
    }

    fn delete(&self, id: &RecordId) -> StoreResult<bool> {
        if !self.read_lock()?.contains_key(id) {
            return Ok(false);
        }
        self.mutate(|map| Ok(map.remove(id).is_some()))
    }

    fn count(&self) -> StoreResult<usize> {
        Ok(self.read_lock()?.len())
    }
}

impl<D: Document> std::fmt::Debug for JsonFileStore<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileStore")
            .field("path", &self.path)
            .finish()
    }
}
