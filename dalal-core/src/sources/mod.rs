//! Source adapters, normalization, fallback chains and the result cache.

pub mod adapter;
pub mod bse;
pub mod cache;
pub mod fallback;
pub mod market;
pub mod normalize;
pub mod nse;
pub mod nse_archives;
pub mod session;
pub mod synthetic;
pub mod yahoo;

pub use adapter::{AggregateResult, SourceAdapter, SourceError, SourceFailure};
pub use cache::ResultCache;
pub use fallback::FallbackChain;
pub use market::MarketData;
pub use normalize::{normalize_row, parse_date, parse_number, FieldKind, FieldMapping};
pub use synthetic::SyntheticSource;
