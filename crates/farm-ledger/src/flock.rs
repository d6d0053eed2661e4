use std::sync::Arc;

use chrono::{DateTime, Utc};
use farm_store::{Document, DocumentStore, InMemoryStore};
use farm_types::{CalendarDate, RecordId};
use serde::{Deserialize, Serialize};

use crate::error::LedgerResult;
use crate::requests::RegisterFlock;

/// A flock as known to the flock registry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flock {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub flock_name: String,
    pub start_date: CalendarDate,
    pub created_at: DateTime<Utc>,
}

impl Document for Flock {
    const COLLECTION: &'static str = "flocks";

    fn id(&self) -> RecordId {
        self.id
    }
}

/// Source of flock details for populating medicine records.
///
/// The medicine ledger trusts flock ids as given; the registry is only asked
/// for details when a record is read.
pub trait FlockRegistry: Send + Sync {
    fn get(&self, id: &RecordId) -> LedgerResult<Option<Flock>>;

    fn list(&self) -> LedgerResult<Vec<Flock>>;

    fn register(&self, request: RegisterFlock) -> LedgerResult<Flock>;
}

/// Registry backed by a document store collection.
pub struct StoreFlockRegistry {
    store: Arc<dyn DocumentStore<Flock>>,
}

impl StoreFlockRegistry {
    pub fn new(store: Arc<dyn DocumentStore<Flock>>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::<Flock>::new()))
    }
}

impl FlockRegistry for StoreFlockRegistry {
    fn get(&self, id: &RecordId) -> LedgerResult<Option<Flock>> {
        Ok(self.store.get(id)?)
    }

    fn list(&self) -> LedgerResult<Vec<Flock>> {
        Ok(self.store.list()?)
    }

    fn register(&self, request: RegisterFlock) -> LedgerResult<Flock> {
        let input = request.validate()?;
        let flock = Flock {
            id: RecordId::new(),
            flock_name: input.flock_name,
            start_date: input.start_date,
            created_at: Utc::now(),
        };
        self.store.insert(&flock)?;
        tracing::info!(flock = %flock.id, name = %flock.flock_name, "flock registered");
        Ok(flock)
    }
}
