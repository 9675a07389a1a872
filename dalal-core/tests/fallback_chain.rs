//! Integration tests for the fallback orchestrator and result cache,
//! driven by scripted stub adapters.

use chrono::NaiveDate;
use dalal_core::domain::{
    CanonicalField, DatasetKind, DatasetQuery, FieldValue, NormalizedRecord,
};
use dalal_core::sources::{
    FallbackChain, MarketData, SourceAdapter, SourceError,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// What a scripted adapter does when invoked.
#[derive(Clone)]
enum Outcome {
    Rows(usize),
    Empty,
    Fail(SourceError),
}

struct Scripted {
    name: &'static str,
    outcome: Outcome,
    calls: Arc<AtomicUsize>,
}

impl Scripted {
    fn new(name: &'static str, outcome: Outcome) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                name,
                outcome,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }

    fn boxed(name: &'static str, outcome: Outcome) -> Box<dyn SourceAdapter> {
        Box::new(Self::new(name, outcome).0)
    }
}

impl SourceAdapter for Scripted {
    fn name(&self) -> &str {
        self.name
    }

    fn fetch(&self, query: &DatasetQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Outcome::Rows(n) => Ok((0..*n)
                .map(|i| {
                    NormalizedRecord::new()
                        .with(CanonicalField::Symbol, FieldValue::text(&query.symbol))
                        .with(CanonicalField::Quantity, FieldValue::Number(i as f64))
                        .conform(DatasetKind::Deals.schema())
                })
                .collect()),
            Outcome::Empty => Ok(Vec::new()),
            Outcome::Fail(err) => Err(err.clone()),
        }
    }
}

fn query() -> DatasetQuery {
    DatasetQuery::window(
        "RELIANCE",
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
    )
}

#[test]
fn first_nonempty_success_wins_in_chain_order() {
    let chain = FallbackChain::new(vec![
        Scripted::boxed("registry", Outcome::Fail(SourceError::Network("timeout".into()))),
        Scripted::boxed("secondary", Outcome::Rows(3)),
        Scripted::boxed("aggregator", Outcome::Rows(5)),
    ]);

    let result = chain.fetch(&query());

    assert_eq!(result.records.len(), 3);
    assert_eq!(result.provenance.as_deref(), Some("secondary"));
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].source, "registry");
}

#[test]
fn later_adapters_are_not_invoked_after_a_win() {
    let (first, first_calls) = Scripted::new("first", Outcome::Rows(2));
    let (second, second_calls) = Scripted::new("second", Outcome::Rows(2));
    let chain = FallbackChain::new(vec![Box::new(first), Box::new(second)]);

    chain.fetch(&query());

    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn all_failures_are_collected_in_chain_order() {
    let chain = FallbackChain::new(vec![
        Scripted::boxed("a", Outcome::Fail(SourceError::Network("connection refused".into()))),
        Scripted::boxed("b", Outcome::Fail(SourceError::HttpStatus { status: 503 })),
        Scripted::boxed("c", Outcome::Fail(SourceError::Schema("missing 'data'".into()))),
    ]);

    let result = chain.fetch(&query());

    assert!(result.records.is_empty());
    assert_eq!(result.provenance, None);
    assert_eq!(result.failures.len(), 3);
    let sources: Vec<&str> = result.failures.iter().map(|f| f.source.as_str()).collect();
    assert_eq!(sources, vec!["a", "b", "c"]);
}

#[test]
fn empty_success_counts_as_failure_and_continues() {
    let chain = FallbackChain::new(vec![
        Scripted::boxed("empty_one", Outcome::Empty),
        Scripted::boxed("has_rows", Outcome::Rows(1)),
    ]);

    let result = chain.fetch(&query());

    assert_eq!(result.provenance.as_deref(), Some("has_rows"));
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].error, SourceError::Empty);
}

#[test]
fn all_empty_yields_one_empty_failure_per_adapter() {
    let chain = FallbackChain::new(vec![
        Scripted::boxed("a", Outcome::Empty),
        Scripted::boxed("b", Outcome::Empty),
        Scripted::boxed("c", Outcome::Empty),
    ]);

    let result = chain.fetch(&query());

    assert!(result.records.is_empty());
    assert_eq!(result.provenance, None);
    assert_eq!(result.failures.len(), 3);
    for failure in &result.failures {
        assert_eq!(failure.error.to_string(), "empty response");
    }
}

#[test]
fn provenance_is_some_iff_records_nonempty() {
    let win = FallbackChain::new(vec![Scripted::boxed("w", Outcome::Rows(2))]).fetch(&query());
    assert!(!win.records.is_empty());
    assert!(win.provenance.is_some());

    let lose = FallbackChain::new(vec![Scripted::boxed(
        "l",
        Outcome::Fail(SourceError::Empty),
    )])
    .fetch(&query());
    assert!(lose.records.is_empty());
    assert!(lose.provenance.is_none());
}

#[test]
fn end_to_end_registry_timeout_then_secondary_success() {
    // Scenario from the design notes: the official registry times out,
    // the secondary exchange answers with three well-formed rows.
    let chain = FallbackChain::new(vec![
        Scripted::boxed("registry", Outcome::Fail(SourceError::Network("timeout".into()))),
        Scripted::boxed("secondary", Outcome::Rows(3)),
    ]);

    let result = chain.fetch(&query());

    assert_eq!(result.records.len(), 3);
    for rec in &result.records {
        assert!(rec.matches_schema(DatasetKind::Deals.schema()));
    }
    assert_eq!(result.provenance.as_deref(), Some("secondary"));
    let reasons: Vec<String> = result.failures.iter().map(|f| f.to_string()).collect();
    assert_eq!(reasons, vec!["registry: network error: timeout"]);
}

// ── Result cache behaviour through the facade ───────────────────────

fn market_with(
    outcomes: Vec<(&'static str, Outcome)>,
    ttl: Duration,
) -> (MarketData, Vec<Arc<AtomicUsize>>) {
    let mut adapters: Vec<Box<dyn SourceAdapter>> = Vec::new();
    let mut counters = Vec::new();
    for (name, outcome) in outcomes {
        let (adapter, calls) = Scripted::new(name, outcome);
        adapters.push(Box::new(adapter));
        counters.push(calls);
    }
    let mut chains = BTreeMap::new();
    chains.insert(DatasetKind::Deals, FallbackChain::new(adapters));
    (MarketData::with_chains(chains, ttl), counters)
}

#[test]
fn repeat_fetch_within_ttl_invokes_no_adapter() {
    let (market, counters) = market_with(
        vec![("only", Outcome::Rows(2))],
        Duration::from_secs(60),
    );
    let q = query();

    let first = market.fetch(DatasetKind::Deals, &q);
    let second = market.fetch(DatasetKind::Deals, &q);

    assert_eq!(first.records.len(), second.records.len());
    assert_eq!(second.provenance.as_deref(), Some("only"));
    assert_eq!(counters[0].load(Ordering::SeqCst), 1);
}

#[test]
fn failed_results_are_memoized_too() {
    let (market, counters) = market_with(
        vec![("down", Outcome::Fail(SourceError::HttpStatus { status: 503 }))],
        Duration::from_secs(60),
    );
    let q = query();

    market.fetch(DatasetKind::Deals, &q);
    let again = market.fetch(DatasetKind::Deals, &q);

    assert_eq!(counters[0].load(Ordering::SeqCst), 1);
    assert_eq!(again.failures.len(), 1);
}

#[test]
fn different_queries_do_not_share_cache_entries() {
    let (market, counters) = market_with(
        vec![("only", Outcome::Rows(1))],
        Duration::from_secs(60),
    );

    market.fetch(DatasetKind::Deals, &query());
    let mut other = query();
    other.symbol = "TCS".into();
    market.fetch(DatasetKind::Deals, &other);

    assert_eq!(counters[0].load(Ordering::SeqCst), 2);
}

#[test]
fn after_ttl_expiry_the_chain_reruns_from_the_top() {
    // The second adapter wins both times, but after expiry the chain
    // must start again at the first adapter — no sticky-source shortcut.
    let (market, counters) = market_with(
        vec![
            ("flaky", Outcome::Fail(SourceError::Network("timeout".into()))),
            ("steady", Outcome::Rows(2)),
        ],
        Duration::from_millis(20),
    );
    let q = query();

    market.fetch(DatasetKind::Deals, &q);
    std::thread::sleep(Duration::from_millis(30));
    let second = market.fetch(DatasetKind::Deals, &q);

    assert_eq!(counters[0].load(Ordering::SeqCst), 2);
    assert_eq!(counters[1].load(Ordering::SeqCst), 2);
    assert_eq!(second.provenance.as_deref(), Some("steady"));
}

#[test]
fn unconfigured_dataset_returns_empty_without_panicking() {
    let (market, _) = market_with(vec![("only", Outcome::Rows(1))], Duration::from_secs(60));

    let result = market.fetch(DatasetKind::News, &query());

    assert!(result.records.is_empty());
    assert!(result.provenance.is_none());
    assert!(result.failures.is_empty());
}
