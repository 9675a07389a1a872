//! The canonical record: an ordered map of canonical fields to typed scalars.

use super::field::{CanonicalField, FieldValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One normalized row of a dataset.
///
/// Invariant: after [`NormalizedRecord::conform`], the record carries
/// exactly its dataset's schema fields — absent source values are
/// `FieldValue::Missing`, never absent keys.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedRecord {
    fields: BTreeMap<CanonicalField, FieldValue>,
}

impl NormalizedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for a field; `Missing` if the field was never set.
    pub fn get(&self, field: CanonicalField) -> &FieldValue {
        self.fields.get(&field).unwrap_or(&FieldValue::Missing)
    }

    pub fn set(&mut self, field: CanonicalField, value: FieldValue) {
        self.fields.insert(field, value);
    }

    /// Builder-style `set`, used when stamping constant fields.
    pub fn with(mut self, field: CanonicalField, value: FieldValue) -> Self {
        self.set(field, value);
        self
    }

    pub fn contains(&self, field: CanonicalField) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalField, &FieldValue)> {
        self.fields.iter()
    }

    /// Force the record onto a dataset schema: fields outside the schema
    /// are dropped, schema fields not present become `Missing`.
    pub fn conform(mut self, schema: &[CanonicalField]) -> Self {
        self.fields.retain(|field, _| schema.contains(field));
        for field in schema {
            self.fields.entry(*field).or_insert(FieldValue::Missing);
        }
        self
    }

    /// True when every schema field is present (possibly as `Missing`).
    pub fn matches_schema(&self, schema: &[CanonicalField]) -> bool {
        self.fields.len() == schema.len() && schema.iter().all(|f| self.fields.contains_key(f))
    }
}
