//! The aggregation facade: one fallback chain per dataset plus the
//! result cache. `fetch` is the single operation the presentation layer
//! consumes.

use super::adapter::{AggregateResult, SourceAdapter};
use super::bse::{BseAnnouncements, BseDeals};
use super::cache::ResultCache;
use super::fallback::FallbackChain;
use super::nse::{NseAnnouncements, NseDeals, NseHistory};
use super::nse_archives::NseArchives;
use super::synthetic::SyntheticSource;
use super::yahoo::{YahooConsensus, YahooHistory};
use crate::config::{AppConfig, ConfigError};
use crate::domain::{DatasetKind, DatasetQuery};
use std::collections::BTreeMap;
use std::time::Duration;

/// Aggregated market data access with memoized fallback chains.
pub struct MarketData {
    chains: BTreeMap<DatasetKind, FallbackChain>,
    cache: ResultCache,
}

impl std::fmt::Debug for MarketData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketData")
            .field("chains", &self.chains.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl MarketData {
    /// Build chains from configuration. Unknown source names are
    /// rejected here rather than surfacing as runtime surprises.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, ConfigError> {
        let timeout = cfg.timeout();
        let mut chains = BTreeMap::new();

        let configured: [(DatasetKind, &[String]); 4] = [
            (DatasetKind::Deals, &cfg.chains.deals),
            (DatasetKind::DeliveryHistory, &cfg.chains.history),
            (DatasetKind::News, &cfg.chains.news),
            (DatasetKind::Consensus, &cfg.chains.consensus),
        ];

        for (kind, names) in configured {
            let mut adapters: Vec<Box<dyn SourceAdapter>> = Vec::with_capacity(names.len());
            for name in names {
                adapters.push(build_adapter(name, kind, timeout)?);
            }
            chains.insert(kind, FallbackChain::new(adapters));
        }

        Ok(Self {
            chains,
            cache: ResultCache::new(cfg.cache_ttl()),
        })
    }

    /// Every chain replaced by the deterministic synthetic source, for
    /// offline runs and demos.
    pub fn offline(cfg: &AppConfig) -> Self {
        let mut chains = BTreeMap::new();
        for kind in [
            DatasetKind::Deals,
            DatasetKind::DeliveryHistory,
            DatasetKind::News,
            DatasetKind::Consensus,
        ] {
            chains.insert(
                kind,
                FallbackChain::new(vec![
                    Box::new(SyntheticSource::new(kind)) as Box<dyn SourceAdapter>
                ]),
            );
        }
        Self {
            chains,
            cache: ResultCache::new(cfg.cache_ttl()),
        }
    }

    /// Explicit chains and TTL — the seam integration tests use.
    pub fn with_chains(chains: BTreeMap<DatasetKind, FallbackChain>, ttl: Duration) -> Self {
        Self {
            chains,
            cache: ResultCache::new(ttl),
        }
    }

    /// Fetch one dataset, memoized by `(kind, query)`.
    ///
    /// A cache hit invokes no adapter. On a miss the chain runs from
    /// its top-priority source and the outcome — success or the full
    /// failure list — is memoized for the TTL window.
    pub fn fetch(&self, kind: DatasetKind, query: &DatasetQuery) -> AggregateResult {
        if let Some(hit) = self.cache.get(kind, query) {
            return hit;
        }

        let result = match self.chains.get(&kind) {
            Some(chain) => chain.fetch(query),
            // No chain configured: empty result, no provenance.
            None => AggregateResult::default(),
        };

        self.cache.put(kind, query, &result);
        result
    }

    /// Configured source order for a dataset (diagnostics).
    pub fn source_names(&self, kind: DatasetKind) -> Vec<&str> {
        self.chains
            .get(&kind)
            .map(|c| c.source_names())
            .unwrap_or_default()
    }
}

/// Resolve a configured source name to an adapter for a dataset.
fn build_adapter(
    name: &str,
    kind: DatasetKind,
    timeout: Duration,
) -> Result<Box<dyn SourceAdapter>, ConfigError> {
    let unknown = || ConfigError::UnknownSource {
        name: name.to_string(),
        dataset: kind.as_str().to_string(),
    };

    let adapter: Box<dyn SourceAdapter> = match (name, kind) {
        ("nse", DatasetKind::Deals) => Box::new(NseDeals::new(timeout)),
        ("nse", DatasetKind::DeliveryHistory) => Box::new(NseHistory::new(timeout)),
        ("nse", DatasetKind::News) => Box::new(NseAnnouncements::new(timeout)),
        ("nse_archives", DatasetKind::Deals) => Box::new(NseArchives::new(timeout)),
        ("bse", DatasetKind::Deals) => Box::new(BseDeals::new(timeout)),
        ("bse", DatasetKind::News) => Box::new(BseAnnouncements::new(timeout)),
        ("yahoo", DatasetKind::DeliveryHistory) => Box::new(YahooHistory::new(timeout)),
        ("yahoo", DatasetKind::Consensus) => Box::new(YahooConsensus::new(timeout)),
        ("synthetic", _) => Box::new(SyntheticSource::with_timeout(kind, timeout)),
        _ => return Err(unknown()),
    };
    Ok(adapter)
}
