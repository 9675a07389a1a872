//! In-memory TTL memoization of chain results.
//!
//! Keys are blake3 fingerprints of the serialized `(DatasetKind,
//! DatasetQuery)` pair, so two structurally identical queries share one
//! entry. Within the TTL window a repeated fetch touches no adapter;
//! after expiry the chain re-runs from the top regardless of which
//! source won last time. All-failed results are memoized too, which
//! keeps a flapping provider from being hammered on every render.

use super::adapter::AggregateResult;
use crate::domain::{DatasetKind, DatasetQuery};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct CacheEntry {
    stored_at: Instant,
    result: AggregateResult,
}

/// TTL-bounded result memo. The only shared mutable state in the crate.
pub struct ResultCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Default memo window: five minutes.
    pub fn default_window() -> Self {
        Self::new(Duration::from_secs(5 * 60))
    }

    /// Deterministic cache key for a query.
    pub fn fingerprint(kind: DatasetKind, query: &DatasetQuery) -> String {
        let json = serde_json::to_string(&(kind, query))
            .expect("DatasetQuery must serialize");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    /// Fresh entry for the query, if any. Expired entries are evicted
    /// on the way out.
    pub fn get(&self, kind: DatasetKind, query: &DatasetQuery) -> Option<AggregateResult> {
        let key = Self::fingerprint(kind, query);
        let mut entries = self.entries.lock().unwrap();
        match entries.get(&key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.result.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, kind: DatasetKind, query: &DatasetQuery, result: &AggregateResult) {
        let key = Self::fingerprint(kind, query);
        self.entries.lock().unwrap().insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                result: result.clone(),
            },
        );
    }

    /// Number of live entries (expired ones included until touched).
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn query(symbol: &str) -> DatasetQuery {
        DatasetQuery::window(
            symbol,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        )
    }

    fn result_with_provenance(source: &str) -> AggregateResult {
        AggregateResult {
            records: vec![crate::domain::NormalizedRecord::new()],
            provenance: Some(source.into()),
            failures: vec![],
        }
    }

    #[test]
    fn hit_within_ttl() {
        let cache = ResultCache::new(Duration::from_secs(60));
        let q = query("RELIANCE");
        cache.put(DatasetKind::Deals, &q, &result_with_provenance("nse"));

        let hit = cache.get(DatasetKind::Deals, &q).unwrap();
        assert_eq!(hit.provenance.as_deref(), Some("nse"));
    }

    #[test]
    fn kind_is_part_of_the_key() {
        let cache = ResultCache::new(Duration::from_secs(60));
        let q = query("RELIANCE");
        cache.put(DatasetKind::Deals, &q, &result_with_provenance("nse"));

        assert!(cache.get(DatasetKind::News, &q).is_none());
    }

    #[test]
    fn distinct_queries_do_not_collide() {
        let cache = ResultCache::new(Duration::from_secs(60));
        cache.put(
            DatasetKind::Deals,
            &query("RELIANCE"),
            &result_with_provenance("nse"),
        );
        assert!(cache.get(DatasetKind::Deals, &query("TCS")).is_none());
    }

    #[test]
    fn entry_expires_after_ttl() {
        let cache = ResultCache::new(Duration::from_millis(10));
        let q = query("RELIANCE");
        cache.put(DatasetKind::Deals, &q, &result_with_provenance("nse"));

        std::thread::sleep(Duration::from_millis(15));
        assert!(cache.get(DatasetKind::Deals, &q).is_none());
        // Expired entry was evicted on read.
        assert!(cache.is_empty());
    }

    #[test]
    fn fingerprint_is_stable_for_equal_queries() {
        let a = ResultCache::fingerprint(DatasetKind::Deals, &query("RELIANCE"));
        let b = ResultCache::fingerprint(DatasetKind::Deals, &query("RELIANCE"));
        assert_eq!(a, b);
    }
}
