//! Document storage for the farm ledger.
//!
//! A collection holds whole documents keyed by [`RecordId`](farm_types::RecordId).
//! Callers fetch a document, mutate it in memory and save it back; the store
//! never interprets document contents.
//!
//! # Storage Backends
//!
//! All backends implement the [`DocumentStore`] trait:
//!
//! - [`InMemoryStore`] -- map-backed store for tests and embedding
//! - [`JsonFileStore`] -- in-memory view persisted to one JSON file per collection
//!
//! # Design Rules
//!
//! 1. Atomicity is per document: a `save` replaces the whole document or nothing.
//! 2. Listing returns documents in id order, which for UUID v7 ids is creation order.
//! 3. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::JsonFileStore;
pub use memory::InMemoryStore;
pub use traits::{Document, DocumentStore};
