use std::sync::Arc;

use chrono::Utc;
use farm_store::{DocumentStore, InMemoryStore};
use farm_types::RecordId;
use tracing::{debug, info, warn};

use crate::aggregate::Ledger;
use crate::error::{LedgerError, LedgerResult};
use crate::locks::KeyedLocks;
use crate::records::{FeedStock, PurchaseEntry};
use crate::requests::{AddPurchase, UpdatePurchase};

const FEED_STOCK_NOT_FOUND: &str = "Feed stock not found.";
const HISTORY_NOT_FOUND: &str = "Feed stock history item not found.";

/// Outcome of removing a purchase from a feed stock record.
#[derive(Clone, Debug)]
pub struct HistoryRemoval {
    pub stock: FeedStock,
    /// `None` when no entry had the requested id; the record is then left untouched.
    pub removed: Option<PurchaseEntry>,
}

/// Outcome of editing a purchase.
#[derive(Clone, Debug)]
pub struct HistoryUpdate {
    pub stock: FeedStock,
    pub entry: PurchaseEntry,
}

/// Feed stock ledger: one record per feed type, `currentStock` tracking the
/// purchase history.
///
/// Writes are serialized per feed type. Operations addressed by record id
/// resolve the feed type first, take its lock, then reload the record.
pub struct FeedStockLedger {
    store: Arc<dyn DocumentStore<FeedStock>>,
    locks: KeyedLocks<String>,
}

impl FeedStockLedger {
    pub fn new(store: Arc<dyn DocumentStore<FeedStock>>) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::<FeedStock>::new()))
    }

    /// Record a purchase, creating the feed type's record on first use.
    pub fn add_purchase(&self, request: AddPurchase) -> LedgerResult<FeedStock> {
        let purchase = request.validate()?;

        self.locks.with(&purchase.feed_type, || {
            let now = Utc::now();
            match self.find_by_feed_type(&purchase.feed_type)? {
                Some(mut stock) => {
                    stock.purchase_history.push(PurchaseEntry::new(&purchase));
                    stock.recompute()?;
                    stock.touch(now);
                    self.store.save(&stock)?;
                    debug!(
                        feed_stock = %stock.id,
                        feed_type = %stock.feed_type,
                        weight = purchase.purchase_weight,
                        current_stock = stock.current_stock,
                        "purchase appended"
                    );
                    Ok(stock)
                }
                None => {
                    let stock = FeedStock::new(&purchase, now);
                    self.store.insert(&stock)?;
                    info!(
                        feed_stock = %stock.id,
                        feed_type = %stock.feed_type,
                        current_stock = stock.current_stock,
                        "feed stock created"
                    );
                    Ok(stock)
                }
            }
        })
    }

    pub fn find_by_feed_type(&self, feed_type: &str) -> LedgerResult<Option<FeedStock>> {
        Ok(self
            .store
            .find_one(&|stock: &FeedStock| stock.feed_type == feed_type)?)
    }

    pub fn list(&self) -> LedgerResult<Vec<FeedStock>> {
        Ok(self.store.list()?)
    }

    pub fn get(&self, id: &RecordId) -> LedgerResult<FeedStock> {
        self.store
            .get(id)?
            .ok_or_else(|| LedgerError::not_found(FEED_STOCK_NOT_FOUND))
    }

    /// Remove one purchase. An unknown `history_id` leaves the record as it is.
    pub fn delete_history(
        &self,
        stock_id: &RecordId,
        history_id: &RecordId,
    ) -> LedgerResult<HistoryRemoval> {
        self.with_record(stock_id, |mut stock| {
            let Some(removed) = stock.remove_entry(history_id) else {
                warn!(
                    feed_stock = %stock_id,
                    history = %history_id,
                    "history entry not found, stock unchanged"
                );
                return Ok(HistoryRemoval {
                    stock,
                    removed: None,
                });
            };

            stock.recompute()?;
            stock.touch(Utc::now());
            self.store.save(&stock)?;
            debug!(
                feed_stock = %stock.id,
                history = %history_id,
                weight = removed.purchase_weight,
                current_stock = stock.current_stock,
                "purchase removed"
            );
            Ok(HistoryRemoval {
                stock,
                removed: Some(removed),
            })
        })
    }

    /// Apply the supplied fields to one purchase.
    pub fn update_history(
        &self,
        stock_id: &RecordId,
        history_id: &RecordId,
        request: UpdatePurchase,
    ) -> LedgerResult<HistoryUpdate> {
        let update = request.validate()?;

        self.with_record(stock_id, |mut stock| {
            let entry = {
                let entry = stock
                    .entry_mut(history_id)
                    .ok_or_else(|| LedgerError::not_found(HISTORY_NOT_FOUND))?;
                if let Some(date) = update.purchase_date {
                    entry.purchase_date = date;
                }
                if let Some(weight) = update.purchase_weight {
                    entry.purchase_weight = weight;
                }
                if let Some(price) = update.price_per_unit {
                    entry.price_per_unit = price;
                }
                entry.clone()
            };

            stock.recompute()?;
            stock.touch(Utc::now());
            self.store.save(&stock)?;
            debug!(
                feed_stock = %stock.id,
                history = %history_id,
                current_stock = stock.current_stock,
                "purchase updated"
            );
            Ok(HistoryUpdate { stock, entry })
        })
    }

    /// Delete a whole feed stock record with its history.
    pub fn delete(&self, id: &RecordId) -> LedgerResult<FeedStock> {
        self.with_record(id, |stock| {
            if !self.store.delete(&stock.id)? {
                return Err(LedgerError::not_found(FEED_STOCK_NOT_FOUND));
            }
            info!(feed_stock = %stock.id, feed_type = %stock.feed_type, "feed stock deleted");
            Ok(stock)
        })
    }

    fn with_record<T>(
        &self,
        id: &RecordId,
        f: impl FnOnce(FeedStock) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        let key = self.get(id)?.feed_type;
        self.locks.with(&key, || f(self.get(id)?))
    }
}
