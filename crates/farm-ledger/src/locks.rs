use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use crate::error::{LedgerError, LedgerResult};

/// Per-key write serialization.
///
/// Each ledger mutation is a read-modify-write of one parent record. Running
/// the whole cycle under the parent's key lock means two writers on the same
/// feed type or flock cannot overwrite each other's entries. Different keys
/// never contend. Slots are dropped from the table once no caller holds them.
pub struct KeyedLocks<K> {
    table: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Clone + Debug,
{
    pub fn new() -> Self {
        Self {
            table: Mutex::new(HashMap::new()),
        }
    }

    /// Run `f` while holding the lock for `key`.
    pub fn with<T>(&self, key: &K, f: impl FnOnce() -> LedgerResult<T>) -> LedgerResult<T> {
        let slot = {
            let mut table = self.table_lock(key)?;
            Arc::clone(table.entry(key.clone()).or_default())
        };

        let result = {
            let _guard = slot
                .lock()
                .map_err(|_| LedgerError::LockPoisoned(format!("{key:?}")))?;
            f()
        };

        let mut table = self.table_lock(key)?;
        // One reference in the table, one held here.
        if Arc::strong_count(&slot) == 2 {
            table.remove(key);
        }
        result
    }

    /// Number of keys currently held or waited on.
    #[cfg(test)]
    fn active_keys(&self) -> usize {
        self.table.lock().map(|t| t.len()).unwrap_or(0)
    }

    fn table_lock(
        &self,
        key: &K,
    ) -> LedgerResult<std::sync::MutexGuard<'_, HashMap<K, Arc<Mutex<()>>>>> {
        self.table
            .lock()
            .map_err(|_| LedgerError::LockPoisoned(format!("{key:?}")))
    }
}

impl<K> Default for KeyedLocks<K>
where
    K: Eq + Hash + Clone + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
