//! Stock and cost ledgers for the farm backend.
//!
//! Two parent record types pair a derived aggregate with an ordered list of
//! entries:
//! - [`FeedStock`]: `currentStock` is the sum of `purchaseHistory[].purchaseWeight`
//! - [`Medicine`]: `totalCost` is the sum of `vaccination[].cost`, floored at zero
//!
//! Every mutation goes through [`FeedStockLedger`] or [`MedicineLedger`],
//! which fetch the parent, change it in memory, recompute the aggregate with
//! [`Ledger::recompute`] and save it back. Writes to the same parent key are
//! serialized through [`KeyedLocks`].

pub mod aggregate;
pub mod error;
pub mod feed;
pub mod flock;
pub mod locks;
pub mod medicine;
pub mod records;
pub mod requests;

pub use aggregate::Ledger;
pub use error::{LedgerError, LedgerResult};
pub use feed::{FeedStockLedger, HistoryRemoval, HistoryUpdate};
pub use flock::{Flock, FlockRegistry, StoreFlockRegistry};
pub use locks::KeyedLocks;
pub use medicine::{FlockRef, MedicineLedger, MedicineView};
pub use records::{FeedStock, Medicine, PurchaseEntry, Vaccination};
pub use requests::{
    AddPurchase, AddVaccination, NewFlock, NewPurchase, NewVaccination, RegisterFlock,
    UpdatePurchase, UpdateVaccination,
};
