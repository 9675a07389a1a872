//! Source adapter trait and structured error types.
//!
//! The SourceAdapter trait abstracts over upstream providers (NSE live
//! API, NSE archives, BSE, Yahoo Finance, synthetic) so chains can be
//! assembled from configuration and mocked for tests.

use crate::domain::{DatasetQuery, NormalizedRecord};
use thiserror::Error;

/// Structured error types for one adapter invocation.
///
/// Every variant is recoverable at the chain level — it only ever causes
/// a fallback to the next adapter, never a crash.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Timeout, connection refused, DNS failure.
    #[error("network error: {0}")]
    Network(String),

    /// Provider answered with a non-2xx status.
    #[error("HTTP status {status}")]
    HttpStatus { status: u16 },

    /// Payload present but unparseable, or a required field is absent.
    #[error("schema error: {0}")]
    Schema(String),

    /// Well-formed response with zero rows.
    #[error("empty response")]
    Empty,
}

/// One adapter's failure, tagged with its provenance. Chain order is
/// preserved in [`AggregateResult::failures`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: String,
    pub error: SourceError,
}

impl std::fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.source, self.error)
    }
}

/// Outcome of a full fallback-chain run.
///
/// Invariant: `provenance` is `Some` exactly when `records` is non-empty.
#[derive(Debug, Clone, Default)]
pub struct AggregateResult {
    pub records: Vec<NormalizedRecord>,
    /// Name of the adapter that won, `None` when every source failed.
    pub provenance: Option<String>,
    /// Per-source failure reasons, in chain order.
    pub failures: Vec<SourceFailure>,
}

impl AggregateResult {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Diagnostic line for the "all sources failed" case.
    pub fn failure_summary(&self) -> String {
        self.failures
            .iter()
            .map(SourceFailure::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Trait for upstream data sources.
///
/// Implementations handle the specifics of one provider: session
/// warm-up, request building, payload parsing, normalization. An
/// adapter performs exactly one attempt per call — no internal retries,
/// no state carried across calls. Every failure path must come back as
/// a typed `SourceError`, never a panic.
pub trait SourceAdapter: Send + Sync {
    /// Stable identifier used for provenance, failures and configuration.
    fn name(&self) -> &str;

    /// Fetch and normalize rows for the query. `Ok` with zero rows is
    /// legal and is treated as [`SourceError::Empty`] by the chain.
    fn fetch(&self, query: &DatasetQuery) -> Result<Vec<NormalizedRecord>, SourceError>;
}
