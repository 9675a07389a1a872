//! Fallback chain — ordered, sequential, first-non-empty-success wins.
//!
//! Adapters are tried strictly in configuration order. Every failure
//! (including a well-formed but empty response) is recorded and the
//! chain moves on; nothing is retried and nothing races in parallel, so
//! the worst case is the sum of the adapters' timeouts. That trade-off
//! is deliberate: the process is short-lived per request and the next
//! rung of the chain is the degradation mechanism.

use super::adapter::{AggregateResult, SourceAdapter, SourceError, SourceFailure};
use crate::domain::DatasetQuery;

/// Ordered adapters for one logical dataset.
pub struct FallbackChain {
    adapters: Vec<Box<dyn SourceAdapter>>,
}

impl FallbackChain {
    pub fn new(adapters: Vec<Box<dyn SourceAdapter>>) -> Self {
        Self { adapters }
    }

    /// Adapter names in priority order.
    pub fn source_names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Run the chain for one query.
    ///
    /// Returns records from the first adapter that succeeds with at
    /// least one row, with that adapter's name as provenance and the
    /// failures collected so far. If every adapter fails or comes back
    /// empty, the result carries no provenance and one failure per
    /// adapter, in chain order.
    pub fn fetch(&self, query: &DatasetQuery) -> AggregateResult {
        let mut failures: Vec<SourceFailure> = Vec::new();

        for adapter in &self.adapters {
            match adapter.fetch(query) {
                Ok(records) if records.is_empty() => failures.push(SourceFailure {
                    source: adapter.name().to_string(),
                    error: SourceError::Empty,
                }),
                Ok(mut records) => {
                    if let Some(limit) = query.limit {
                        records.truncate(limit);
                    }
                    return AggregateResult {
                        records,
                        provenance: Some(adapter.name().to_string()),
                        failures,
                    };
                }
                Err(error) => failures.push(SourceFailure {
                    source: adapter.name().to_string(),
                    error,
                }),
            }
        }

        AggregateResult {
            records: Vec::new(),
            provenance: None,
            failures,
        }
    }
}
