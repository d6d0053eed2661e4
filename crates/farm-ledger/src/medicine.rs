use std::sync::Arc;

use chrono::{DateTime, Utc};
use farm_store::{DocumentStore, InMemoryStore};
use farm_types::RecordId;
use serde::Serialize;
use tracing::{debug, info};

use crate::aggregate::Ledger;
use crate::error::{LedgerError, LedgerResult};
use crate::flock::{Flock, FlockRegistry, StoreFlockRegistry};
use crate::locks::KeyedLocks;
use crate::records::{Medicine, Vaccination};
use crate::requests::{AddVaccination, UpdateVaccination};

const MEDICINE_NOT_FOUND: &str = "Medicine not found";
const MEDICINE_NOT_FOUND_FOR_FLOCK: &str = "Medicine not found for the given flockId";
const NO_MEDICINE_RECORDS: &str = "No medicine records found";
const VACCINATION_NOT_FOUND: &str = "Vaccination not found";

/// The flock a medicine record belongs to, as shown to readers.
///
/// Falls back to the bare id when the registry does not know the flock.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FlockRef {
    Populated(Flock),
    Unresolved(RecordId),
}

/// A medicine record with its flock populated inline.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineView {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub flock_id: FlockRef,
    pub total_cost: f64,
    pub vaccination: Vec<Vaccination>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Medicine ledger: one record per flock, `totalCost` tracking the
/// vaccinations given.
///
/// Writes are serialized per flock id.
pub struct MedicineLedger {
    store: Arc<dyn DocumentStore<Medicine>>,
    flocks: Arc<dyn FlockRegistry>,
    locks: KeyedLocks<RecordId>,
    empty_list_not_found: bool,
}

impl MedicineLedger {
    pub fn new(store: Arc<dyn DocumentStore<Medicine>>, flocks: Arc<dyn FlockRegistry>) -> Self {
        Self {
            store,
            flocks,
            locks: KeyedLocks::new(),
            empty_list_not_found: true,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryStore::<Medicine>::new()),
            Arc::new(StoreFlockRegistry::in_memory()),
        )
    }

    /// Whether listing an empty collection reports not-found (the default)
    /// or returns an empty list.
    pub fn with_empty_list_not_found(mut self, enabled: bool) -> Self {
        self.empty_list_not_found = enabled;
        self
    }

    /// Record a vaccination, creating the flock's record on first use.
    ///
    /// The flock id is not checked against the registry.
    pub fn add_vaccination(
        &self,
        flock_id: &RecordId,
        request: AddVaccination,
    ) -> LedgerResult<Medicine> {
        let input = request.validate()?;

        self.locks.with(flock_id, || {
            let now = Utc::now();
            match self.find_by_flock(flock_id)? {
                Some(mut medicine) => {
                    medicine.vaccination.push(Vaccination::new(&input));
                    medicine.recompute()?;
                    medicine.touch(now);
                    self.store.save(&medicine)?;
                    debug!(
                        medicine = %medicine.id,
                        flock = %flock_id,
                        cost = input.cost,
                        total_cost = medicine.total_cost,
                        "vaccination appended"
                    );
                    Ok(medicine)
                }
                None => {
                    let medicine = Medicine::new(*flock_id, &input, now);
                    self.store.insert(&medicine)?;
                    info!(
                        medicine = %medicine.id,
                        flock = %flock_id,
                        total_cost = medicine.total_cost,
                        "medicine record created"
                    );
                    Ok(medicine)
                }
            }
        })
    }

    pub fn find_by_flock(&self, flock_id: &RecordId) -> LedgerResult<Option<Medicine>> {
        Ok(self
            .store
            .find_one(&|m: &Medicine| &m.flock_id == flock_id)?)
    }

    /// Every record with its flock populated.
    pub fn list(&self) -> LedgerResult<Vec<MedicineView>> {
        let records = self.store.list()?;
        if records.is_empty() && self.empty_list_not_found {
            return Err(LedgerError::not_found(NO_MEDICINE_RECORDS));
        }
        records.into_iter().map(|m| self.populate(m)).collect()
    }

    pub fn get_by_flock(&self, flock_id: &RecordId) -> LedgerResult<MedicineView> {
        let medicine = self
            .find_by_flock(flock_id)?
            .ok_or_else(|| LedgerError::not_found(MEDICINE_NOT_FOUND_FOR_FLOCK))?;
        self.populate(medicine)
    }

    /// Remove one vaccination. Both the record and the entry must exist.
    pub fn delete_vaccination(
        &self,
        flock_id: &RecordId,
        vaccination_id: &RecordId,
    ) -> LedgerResult<Medicine> {
        self.locks.with(flock_id, || {
            let mut medicine = self.require_by_flock(flock_id)?;
            let removed = medicine
                .remove_entry(vaccination_id)
                .ok_or_else(|| LedgerError::not_found(VACCINATION_NOT_FOUND))?;

            medicine.recompute()?;
            medicine.touch(Utc::now());
            self.store.save(&medicine)?;
            debug!(
                medicine = %medicine.id,
                vaccination = %vaccination_id,
                cost = removed.cost,
                total_cost = medicine.total_cost,
                "vaccination removed"
            );
            Ok(medicine)
        })
    }

    /// Replace the fields of the vaccination named in the request, keeping its id.
    pub fn update_vaccination(
        &self,
        flock_id: &RecordId,
        request: UpdateVaccination,
    ) -> LedgerResult<Medicine> {
        let (vaccination_id, input) = request.validate()?;

        self.locks.with(flock_id, || {
            let mut medicine = self.require_by_flock(flock_id)?;
            if !medicine.replace_entry(&vaccination_id, &input) {
                return Err(LedgerError::not_found(VACCINATION_NOT_FOUND));
            }

            medicine.recompute()?;
            medicine.touch(Utc::now());
            self.store.save(&medicine)?;
            debug!(
                medicine = %medicine.id,
                vaccination = %vaccination_id,
                total_cost = medicine.total_cost,
                "vaccination updated"
            );
            Ok(medicine)
        })
    }

    /// Delete a whole medicine record by its own id.
    pub fn delete(&self, medicine_id: &RecordId) -> LedgerResult<Medicine> {
        let flock_id = self.require(medicine_id)?.flock_id;

        self.locks.with(&flock_id, || {
            let medicine = self.require(medicine_id)?;
            if !self.store.delete(medicine_id)? {
                return Err(LedgerError::not_found(MEDICINE_NOT_FOUND));
            }
            info!(medicine = %medicine_id, flock = %flock_id, "medicine record deleted");
            Ok(medicine)
        })
    }

    fn require(&self, medicine_id: &RecordId) -> LedgerResult<Medicine> {
        self.store
            .get(medicine_id)?
            .ok_or_else(|| LedgerError::not_found(MEDICINE_NOT_FOUND))
    }

    fn require_by_flock(&self, flock_id: &RecordId) -> LedgerResult<Medicine> {
        self.find_by_flock(flock_id)?
            .ok_or_else(|| LedgerError::not_found(MEDICINE_NOT_FOUND))
    }

    fn populate(&self, medicine: Medicine) -> LedgerResult<MedicineView> {
        let flock_id = match self.flocks.get(&medicine.flock_id)? {
            Some(flock) => FlockRef::Populated(flock),
            None => FlockRef::Unresolved(medicine.flock_id),
        };
        Ok(MedicineView {
            id: medicine.id,
            flock_id,
            total_cost: medicine.total_cost,
            vaccination: medicine.vaccination,
            created_at: medicine.created_at,
            updated_at: medicine.updated_at,
        })
    }
}
