//! Canonical domain types: fields, records, queries.

pub mod field;
pub mod query;
pub mod record;

pub use field::{BuySell, CanonicalField, FieldValue};
pub use query::{DatasetKind, DatasetQuery, DealType};
pub use record::NormalizedRecord;
