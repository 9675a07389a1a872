//! Dataset identifiers and the immutable query value.

use super::field::CanonicalField;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Logical dataset served by a fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DatasetKind {
    /// Bulk/block deal disclosures.
    Deals,
    /// Daily price, volume and deliverable-quantity history.
    DeliveryHistory,
    /// Corporate announcements and market news.
    News,
    /// Analyst price targets and ratings.
    Consensus,
}

impl DatasetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Deals => "deals",
            DatasetKind::DeliveryHistory => "history",
            DatasetKind::News => "news",
            DatasetKind::Consensus => "consensus",
        }
    }

    /// Canonical field set every record of this dataset must carry.
    pub fn schema(&self) -> &'static [CanonicalField] {
        use CanonicalField::*;
        match self {
            DatasetKind::Deals => &[
                Symbol, Entity, BuySell, Quantity, Price, Date, Exchange, Segment,
            ],
            DatasetKind::DeliveryHistory => &[
                Date, Open, High, Low, Close, Volume, DeliveryQty, DeliveryPct,
            ],
            DatasetKind::News => &[Date, Symbol, Headline, Source, Url],
            DatasetKind::Consensus => &[Symbol, Price, TargetPrice, AnalystCount, Rating],
        }
    }
}

impl std::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deal disclosure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealType {
    /// Single trade above a fixed percentage of listed shares, disclosed same-day.
    Bulk,
    /// Large pre-negotiated trade executed in the special window.
    Block,
}

impl DealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealType::Bulk => "bulk",
            DealType::Block => "block",
        }
    }
}

/// Request shape passed unchanged to every adapter in a chain.
///
/// The serialized form of `(DatasetKind, DatasetQuery)` keys the result
/// cache, so two identical queries within the TTL window share one fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetQuery {
    pub symbol: String,
    pub deal_type: DealType,
    /// Inclusive start of the date range.
    pub from: NaiveDate,
    /// Inclusive end of the date range.
    pub to: NaiveDate,
    /// Optional cap on returned rows, applied after the winning fetch.
    pub limit: Option<usize>,
}

impl DatasetQuery {
    /// Query covering the trailing `days` ending today (30/60/90 are the
    /// conventional windows).
    pub fn trailing(symbol: &str, days: u32) -> Self {
        let to = chrono::Local::now().date_naive();
        Self::window(symbol, to - chrono::Duration::days(i64::from(days)), to)
    }

    /// Query over an explicit inclusive date range.
    pub fn window(symbol: &str, from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            symbol: symbol.trim().to_ascii_uppercase(),
            deal_type: DealType::Bulk,
            from,
            to,
            limit: None,
        }
    }

    pub fn with_deal_type(mut self, deal_type: DealType) -> Self {
        self.deal_type = deal_type;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_uppercases_symbol() {
        let q = DatasetQuery::window(
            " reliance ",
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        );
        assert_eq!(q.symbol, "RELIANCE");
        assert_eq!(q.deal_type, DealType::Bulk);
        assert_eq!(q.limit, None);
    }

    #[test]
    fn trailing_window_spans_requested_days() {
        let q = DatasetQuery::trailing("TCS", 30);
        assert_eq!((q.to - q.from).num_days(), 30);
    }

    #[test]
    fn schemas_are_nonempty_and_distinct() {
        let kinds = [
            DatasetKind::Deals,
            DatasetKind::DeliveryHistory,
            DatasetKind::News,
            DatasetKind::Consensus,
        ];
        for kind in kinds {
            assert!(!kind.schema().is_empty());
        }
        assert_ne!(DatasetKind::Deals.schema(), DatasetKind::News.schema());
    }
}
