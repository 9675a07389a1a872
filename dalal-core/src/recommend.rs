//! Multi-method stock recommendation aggregator.
//!
//! Combines two independent legs — an intraday view from recent price
//! and deliverable-volume action, and a long-term view from analyst
//! consensus — into one serializable result. Each leg marks itself
//! unavailable when its chain came back empty; the overall `error` is
//! populated only when both legs failed.

use crate::domain::{CanonicalField, DatasetKind, DatasetQuery, NormalizedRecord};
use crate::scorer::{score, Horizon, Snapshot, Verdict};
use crate::sources::MarketData;
use crate::universe;
use serde::Serialize;

/// Short-horizon leg of a recommendation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntradayView {
    pub available: bool,
    pub recommendation: Option<Verdict>,
    pub target: Option<f64>,
    pub stop_loss: Option<f64>,
    pub momentum_pct: Option<f64>,
}

/// Analyst-consensus leg of a recommendation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LongTermView {
    pub available: bool,
    pub recommendation: Option<Verdict>,
    pub avg_target: Option<f64>,
    pub num_analysts: Option<u32>,
}

/// Full recommendation for one symbol.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecommendation {
    pub symbol: String,
    pub name: String,
    pub current_price: Option<f64>,
    pub intraday: IntradayView,
    pub longterm: LongTermView,
    /// Concatenated per-source failure reasons, set only when both
    /// legs are unavailable.
    pub error: Option<String>,
}

/// Bars of close-to-close lookback for the intraday momentum signal.
const MOMENTUM_BARS: usize = 5;
/// Bars averaged for the delivery-percentage signal.
const DELIVERY_BARS: usize = 5;
/// Prior bars the recent volume average is compared against.
const VOLUME_BASE_BARS: usize = 20;

/// Builds recommendations on top of the aggregation facade.
pub struct Recommender<'a> {
    market: &'a MarketData,
    window_days: u32,
}

impl<'a> Recommender<'a> {
    pub fn new(market: &'a MarketData) -> Self {
        Self {
            market,
            window_days: 90,
        }
    }

    pub fn with_window(mut self, days: u32) -> Self {
        self.window_days = days;
        self
    }

    /// Assemble both legs for one symbol.
    pub fn recommend(&self, symbol: &str) -> StockRecommendation {
        let query = DatasetQuery::trailing(symbol, self.window_days);

        let history = self.market.fetch(DatasetKind::DeliveryHistory, &query);
        let consensus = self.market.fetch(DatasetKind::Consensus, &query);

        let (intraday, last_close) = intraday_leg(&history.records);
        let longterm = longterm_leg(&consensus.records, last_close);

        let consensus_price = consensus
            .records
            .first()
            .and_then(|r| r.get(CanonicalField::Price).as_number());
        let current_price = last_close.or(consensus_price);

        let error = if !intraday.available && !longterm.available {
            let mut reasons = Vec::new();
            if !history.failures.is_empty() {
                reasons.push(format!("history: {}", history.failure_summary()));
            }
            if !consensus.failures.is_empty() {
                reasons.push(format!("consensus: {}", consensus.failure_summary()));
            }
            if reasons.is_empty() {
                reasons.push("no data returned by any source".to_string());
            }
            Some(reasons.join(" | "))
        } else {
            None
        };

        StockRecommendation {
            symbol: query.symbol.clone(),
            name: universe::display_name(&query.symbol)
                .unwrap_or(query.symbol.as_str())
                .to_string(),
            current_price,
            intraday,
            longterm,
            error,
        }
    }
}

fn numbers(records: &[NormalizedRecord], field: CanonicalField) -> Vec<f64> {
    records
        .iter()
        .filter_map(|r| r.get(field).as_number())
        .collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Derive the intraday leg from delivery-history records (ascending by
/// date). Also returns the last close for reuse as the current price.
fn intraday_leg(records: &[NormalizedRecord]) -> (IntradayView, Option<f64>) {
    let closes = numbers(records, CanonicalField::Close);
    let Some((&last, _)) = closes.split_last() else {
        return (IntradayView::default(), None);
    };

    let momentum_pct = if closes.len() >= 2 {
        let lookback = MOMENTUM_BARS.min(closes.len() - 1);
        let base = closes[closes.len() - 1 - lookback];
        (base != 0.0).then(|| (last / base - 1.0) * 100.0)
    } else {
        None
    };

    let delivery = numbers(records, CanonicalField::DeliveryPct);
    let delivery_pct = mean(&delivery[delivery.len().saturating_sub(DELIVERY_BARS)..]);

    let volumes = numbers(records, CanonicalField::Volume);
    let volume_trend = if volumes.len() > MOMENTUM_BARS {
        let split = volumes.len() - MOMENTUM_BARS;
        let base_start = split.saturating_sub(VOLUME_BASE_BARS);
        let recent = mean(&volumes[split..]);
        let base = mean(&volumes[base_start..split]);
        match (recent, base) {
            (Some(r), Some(b)) if b > 0.0 => Some(r / b - 1.0),
            _ => None,
        }
    } else {
        None
    };

    let snapshot = Snapshot {
        momentum_pct,
        delivery_pct,
        volume_trend,
        ..Default::default()
    };
    let verdict = score(&snapshot, Horizon::Intraday).verdict;

    let (target, stop_loss) = match verdict {
        Verdict::Buy => (Some(last * 1.02), Some(last * 0.99)),
        Verdict::Avoid => (Some(last * 0.98), Some(last * 1.01)),
        Verdict::Hold => (None, None),
    };

    (
        IntradayView {
            available: true,
            recommendation: Some(verdict),
            target,
            stop_loss,
            momentum_pct,
        },
        Some(last),
    )
}

/// Derive the long-term leg from the consensus record.
fn longterm_leg(records: &[NormalizedRecord], last_close: Option<f64>) -> LongTermView {
    let Some(record) = records.first() else {
        return LongTermView::default();
    };

    let avg_target = record.get(CanonicalField::TargetPrice).as_number();
    let analyst_count = record.get(CanonicalField::AnalystCount).as_number();
    let price = record
        .get(CanonicalField::Price)
        .as_number()
        .or(last_close);

    let upside_pct = match (avg_target, price) {
        (Some(target), Some(price)) if price > 0.0 => Some((target / price - 1.0) * 100.0),
        _ => None,
    };

    let snapshot = Snapshot {
        upside_pct,
        analyst_count,
        ..Default::default()
    };
    let verdict = score(&snapshot, Horizon::LongTerm).verdict;

    LongTermView {
        available: true,
        recommendation: Some(verdict),
        avg_target,
        num_analysts: analyst_count.map(|c| c.max(0.0) as u32),
    }
}
