//! Dalal Core — multi-source market data aggregation for Indian equities.
//!
//! The heart of the crate is the fallback orchestration layer:
//! - Canonical records and typed field values (`domain`)
//! - Source adapters for NSE, the NSE archives, BSE and Yahoo Finance,
//!   plus a deterministic synthetic source (`sources`)
//! - Per-provider field-mapping normalization (`sources::normalize`)
//! - Ordered fallback chains with a TTL result memo (`sources::fallback`,
//!   `sources::cache`, `sources::market`)
//! - A rule-based scorer and the two-leg recommendation aggregator
//!   (`scorer`, `recommend`)

pub mod config;
pub mod domain;
pub mod recommend;
pub mod scorer;
pub mod sources;
pub mod universe;
