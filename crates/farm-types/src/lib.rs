//! Foundation types for the farm ledger.
//!
//! Every other farm crate depends on `farm-types`.
//!
//! # Key Types
//!
//! - [`RecordId`]: time-ordered UUID v7 identifier for documents and sub-entries
//! - [`CalendarDate`]: day-precision date accepting both `YYYY-MM-DD` and RFC 3339 input
//! - [`amount`]: serde helpers that accept numbers sent as JSON numbers or strings

pub mod amount;
pub mod calendar;
pub mod error;
pub mod id;

pub use calendar::CalendarDate;
pub use error::TypeError;
pub use id::RecordId;
