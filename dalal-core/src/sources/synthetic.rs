//! Deterministic synthetic source for offline runs and demos.
//!
//! Rows are generated from an RNG seeded by the queried symbol, so the
//! same query always produces the same data. The adapter never fails;
//! it backs every chain in offline mode.

use super::adapter::{SourceAdapter, SourceError};
use crate::domain::{
    BuySell, CanonicalField, DatasetKind, DatasetQuery, FieldValue, NormalizedRecord,
};
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

const ENTITIES: &[&str] = &[
    "GRAVITON RESEARCH CAPITAL LLP",
    "MORGAN STANLEY ASIA SINGAPORE PTE",
    "SBI MUTUAL FUND",
    "JANE STREET CAPITAL PTE LTD",
    "QUANT MUTUAL FUND",
    "SOCIETE GENERALE",
];

const HEADLINES: &[&str] = &[
    "Board meeting outcome and financial results",
    "Allotment of equity shares under ESOP",
    "Disclosure under SEBI (SAST) Regulations",
    "Schedule of analyst and institutional investor meet",
    "Update on credit rating",
];

/// Symbol-seeded RNG so repeated runs agree.
fn rng_for(symbol: &str) -> StdRng {
    let hash = blake3::hash(symbol.as_bytes());
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&hash.as_bytes()[..8]);
    StdRng::seed_from_u64(u64::from_le_bytes(seed_bytes))
}

fn is_trading_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Offline stand-in for one dataset's chain.
pub struct SyntheticSource {
    kind: DatasetKind,
}

impl SyntheticSource {
    pub fn new(kind: DatasetKind) -> Self {
        Self { kind }
    }

    /// Timeout is accepted for constructor symmetry with the real
    /// adapters; nothing here touches the network.
    pub fn with_timeout(kind: DatasetKind, _timeout: Duration) -> Self {
        Self::new(kind)
    }

    fn deals(query: &DatasetQuery) -> Vec<NormalizedRecord> {
        let mut rng = rng_for(&query.symbol);
        let base_price: f64 = rng.gen_range(100.0..3500.0);
        let count = rng.gen_range(3..=6);
        let schema = DatasetKind::Deals.schema();

        (0..count)
            .map(|i| {
                let side = if rng.gen_bool(0.5) {
                    BuySell::Buy
                } else {
                    BuySell::Sell
                };
                let qty = f64::from(rng.gen_range(50..2000) * 1000);
                let price = base_price * rng.gen_range(0.97..1.03);
                let date = query.to - chrono::Duration::days(i64::from(i));
                NormalizedRecord::new()
                    .with(CanonicalField::Symbol, FieldValue::text(&query.symbol))
                    .with(
                        CanonicalField::Entity,
                        FieldValue::text(ENTITIES[rng.gen_range(0..ENTITIES.len())]),
                    )
                    .with(CanonicalField::BuySell, FieldValue::text(side.as_str()))
                    .with(CanonicalField::Quantity, FieldValue::Number(qty))
                    .with(
                        CanonicalField::Price,
                        FieldValue::Number((price * 100.0).round() / 100.0),
                    )
                    .with(CanonicalField::Date, FieldValue::Date(date))
                    .with(CanonicalField::Exchange, FieldValue::text("SYN"))
                    .with(CanonicalField::Segment, FieldValue::text("Cash"))
                    .conform(schema)
            })
            .collect()
    }

    fn history(query: &DatasetQuery) -> Vec<NormalizedRecord> {
        let mut rng = rng_for(&query.symbol);
        let mut close: f64 = rng.gen_range(100.0..3500.0);
        let schema = DatasetKind::DeliveryHistory.schema();
        let mut records = Vec::new();

        let mut date = query.from;
        while date <= query.to && records.len() < 250 {
            if is_trading_day(date) {
                let drift: f64 = rng.gen_range(-0.02..0.022);
                let open = close;
                close = (open * (1.0 + drift)).max(1.0);
                let high = open.max(close) * rng.gen_range(1.0..1.01);
                let low = open.min(close) * rng.gen_range(0.99..1.0);
                let volume = f64::from(rng.gen_range(500..8000) * 1000);
                let deliv_pct: f64 = rng.gen_range(20.0..80.0);
                let round2 = |v: f64| (v * 100.0).round() / 100.0;

                records.push(
                    NormalizedRecord::new()
                        .with(CanonicalField::Date, FieldValue::Date(date))
                        .with(CanonicalField::Open, FieldValue::Number(round2(open)))
                        .with(CanonicalField::High, FieldValue::Number(round2(high)))
                        .with(CanonicalField::Low, FieldValue::Number(round2(low)))
                        .with(CanonicalField::Close, FieldValue::Number(round2(close)))
                        .with(CanonicalField::Volume, FieldValue::Number(volume))
                        .with(
                            CanonicalField::DeliveryQty,
                            FieldValue::Number((volume * deliv_pct / 100.0).round()),
                        )
                        .with(
                            CanonicalField::DeliveryPct,
                            FieldValue::Number(round2(deliv_pct)),
                        )
                        .conform(schema),
                );
            }
            date += chrono::Duration::days(1);
        }
        records
    }

    fn news(query: &DatasetQuery) -> Vec<NormalizedRecord> {
        let mut rng = rng_for(&query.symbol);
        let schema = DatasetKind::News.schema();
        (0..3)
            .map(|i| {
                NormalizedRecord::new()
                    .with(CanonicalField::Date, {
                        FieldValue::Date(query.to - chrono::Duration::days(i64::from(i)))
                    })
                    .with(CanonicalField::Symbol, FieldValue::text(&query.symbol))
                    .with(
                        CanonicalField::Headline,
                        FieldValue::text(HEADLINES[rng.gen_range(0..HEADLINES.len())]),
                    )
                    .with(CanonicalField::Source, FieldValue::text("SYN"))
                    .with(CanonicalField::Url, FieldValue::Missing)
                    .conform(schema)
            })
            .collect()
    }

    fn consensus(query: &DatasetQuery) -> Vec<NormalizedRecord> {
        let mut rng = rng_for(&query.symbol);
        let price: f64 = rng.gen_range(100.0..3500.0);
        let upside: f64 = rng.gen_range(-0.1..0.25);
        let analysts = f64::from(rng.gen_range(4..30));
        let rating = if upside > 0.08 { "buy" } else { "hold" };
        let round2 = |v: f64| (v * 100.0).round() / 100.0;

        vec![NormalizedRecord::new()
            .with(CanonicalField::Symbol, FieldValue::text(&query.symbol))
            .with(CanonicalField::Price, FieldValue::Number(round2(price)))
            .with(
                CanonicalField::TargetPrice,
                FieldValue::Number(round2(price * (1.0 + upside))),
            )
            .with(CanonicalField::AnalystCount, FieldValue::Number(analysts))
            .with(CanonicalField::Rating, FieldValue::text(rating))
            .conform(DatasetKind::Consensus.schema())]
    }
}

impl SourceAdapter for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, query: &DatasetQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        Ok(match self.kind {
            DatasetKind::Deals => Self::deals(query),
            DatasetKind::DeliveryHistory => Self::history(query),
            DatasetKind::News => Self::news(query),
            DatasetKind::Consensus => Self::consensus(query),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> DatasetQuery {
        DatasetQuery::window(
            "RELIANCE",
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        )
    }

    #[test]
    fn same_symbol_produces_identical_rows() {
        let source = SyntheticSource::new(DatasetKind::Deals);
        let a = source.fetch(&query()).unwrap();
        let b = source.fetch(&query()).unwrap();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn different_symbols_differ() {
        let source = SyntheticSource::new(DatasetKind::Consensus);
        let a = source.fetch(&query()).unwrap();
        let mut other = query();
        other.symbol = "TCS".into();
        let b = source.fetch(&other).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn history_skips_weekends_and_conforms() {
        let source = SyntheticSource::new(DatasetKind::DeliveryHistory);
        let records = source.fetch(&query()).unwrap();
        assert!(!records.is_empty());
        for rec in &records {
            assert!(rec.matches_schema(DatasetKind::DeliveryHistory.schema()));
            let date = rec.get(CanonicalField::Date).as_date().unwrap();
            assert!(is_trading_day(date));
        }
    }

    #[test]
    fn every_kind_produces_schema_conformant_rows() {
        for kind in [
            DatasetKind::Deals,
            DatasetKind::DeliveryHistory,
            DatasetKind::News,
            DatasetKind::Consensus,
        ] {
            let records = SyntheticSource::new(kind).fetch(&query()).unwrap();
            assert!(!records.is_empty(), "{kind} produced no rows");
            for rec in &records {
                assert!(rec.matches_schema(kind.schema()));
            }
        }
    }
}
