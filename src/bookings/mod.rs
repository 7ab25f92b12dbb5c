//! Booking export ingestion.
//!
//! - [`schema`]: column declarations and per-type token coercion
//! - [`binder`]: row → record binding and the delimited row source
//! - [`record`]: the broker's booking row and its asset model
//! - [`ledger`]: caller-side accumulation of a whole export

pub mod binder;
pub mod ledger;
pub mod record;
pub mod schema;

pub use binder::{bind, RowSource};
pub use ledger::{BookingLedger, RejectedRow};
pub use record::{Asset, BookingDetail, Instrument};
pub use schema::{DynamicSchema, Field, FieldType, FieldValue, Record, Schema};
