//! Yahoo Finance adapters.
//!
//! Yahoo has no official API and is subject to unannounced format
//! changes, but it covers NSE listings under the `.NS` suffix and needs
//! no session warm-up, which makes it a resilient fallback: the v8
//! chart API backs the delivery-history chain (with the deliverable
//! columns explicitly Missing — Yahoo has no such data), and the v10
//! quoteSummary API is the analyst-consensus source.

use super::adapter::{SourceAdapter, SourceError};
use super::session::Session;
use crate::domain::{CanonicalField, DatasetKind, DatasetQuery, FieldValue, NormalizedRecord};
use serde::Deserialize;
use std::time::Duration;

/// NSE listings on Yahoo carry this suffix.
const NSE_SUFFIX: &str = ".NS";

fn yahoo_symbol(symbol: &str) -> String {
    format!("{symbol}{NSE_SUFFIX}")
}

// ── v8 chart API (price history) ────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

/// Daily OHLCV history from the Yahoo chart API.
pub struct YahooHistory {
    timeout: Duration,
}

impl YahooHistory {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn url(query: &DatasetQuery) -> String {
        let start_ts = query
            .from
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(0);
        let end_ts = query
            .to
            .and_hms_opt(23, 59, 59)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(0);
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{}?period1={start_ts}&period2={end_ts}&interval=1d",
            yahoo_symbol(&query.symbol)
        )
    }

    fn parse(resp: ChartResponse) -> Result<Vec<NormalizedRecord>, SourceError> {
        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                SourceError::Schema(format!("{}: {}", err.code, err.description))
            } else {
                SourceError::Schema("empty result with no error".into())
            }
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::Schema("result array is empty".into()))?;

        let timestamps = data
            .timestamp
            .ok_or_else(|| SourceError::Schema("no timestamps".into()))?;

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::Schema("no quote data".into()))?;

        let schema = DatasetKind::DeliveryHistory.schema();
        let mut records = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| SourceError::Schema(format!("invalid timestamp: {ts}")))?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();

            // Holidays and non-trading days come through as all-None rows.
            if open.is_none() && high.is_none() && low.is_none() && close.is_none() {
                continue;
            }

            let number = |v: Option<f64>| v.map(FieldValue::Number).unwrap_or(FieldValue::Missing);
            let record = NormalizedRecord::new()
                .with(CanonicalField::Date, FieldValue::Date(date))
                .with(CanonicalField::Open, number(open))
                .with(CanonicalField::High, number(high))
                .with(CanonicalField::Low, number(low))
                .with(CanonicalField::Close, number(close))
                .with(CanonicalField::Volume, number(volume.map(|v| v as f64)))
                .conform(schema);
            records.push(record);
        }

        Ok(records)
    }
}

impl SourceAdapter for YahooHistory {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn fetch(&self, query: &DatasetQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        let session = Session::new(self.timeout)?;
        let payload = session.get_json(&Self::url(query), None)?;
        let chart: ChartResponse = serde_json::from_value(payload)
            .map_err(|e| SourceError::Schema(format!("chart response: {e}")))?;
        Self::parse(chart)
    }
}

// ── v10 quoteSummary API (analyst consensus) ────────────────────────

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryResult,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    result: Option<Vec<QuoteSummaryNode>>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryNode {
    #[serde(rename = "financialData")]
    financial_data: Option<FinancialData>,
}

#[derive(Debug, Deserialize)]
struct FinancialData {
    #[serde(rename = "currentPrice")]
    current_price: Option<RawValue>,
    #[serde(rename = "targetMeanPrice")]
    target_mean_price: Option<RawValue>,
    #[serde(rename = "numberOfAnalystOpinions")]
    analyst_opinions: Option<RawValue>,
    #[serde(rename = "recommendationKey")]
    recommendation_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

/// Analyst price targets and rating from the Yahoo quoteSummary API.
pub struct YahooConsensus {
    timeout: Duration,
}

impl YahooConsensus {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn url(query: &DatasetQuery) -> String {
        format!(
            "https://query2.finance.yahoo.com/v10/finance/quoteSummary/{}?modules=financialData",
            yahoo_symbol(&query.symbol)
        )
    }

    fn parse(
        resp: QuoteSummaryResponse,
        query: &DatasetQuery,
    ) -> Result<Vec<NormalizedRecord>, SourceError> {
        let node = resp
            .quote_summary
            .result
            .and_then(|nodes| nodes.into_iter().next())
            .ok_or_else(|| SourceError::Schema("quoteSummary result is empty".into()))?;

        let Some(fin) = node.financial_data else {
            return Ok(Vec::new());
        };

        let number = |v: &Option<RawValue>| {
            v.as_ref()
                .and_then(|rv| rv.raw)
                .map(FieldValue::Number)
                .unwrap_or(FieldValue::Missing)
        };

        let record = NormalizedRecord::new()
            .with(CanonicalField::Symbol, FieldValue::text(&query.symbol))
            .with(CanonicalField::Price, number(&fin.current_price))
            .with(CanonicalField::TargetPrice, number(&fin.target_mean_price))
            .with(CanonicalField::AnalystCount, number(&fin.analyst_opinions))
            .with(
                CanonicalField::Rating,
                fin.recommendation_key
                    .as_deref()
                    .map(FieldValue::text)
                    .unwrap_or(FieldValue::Missing),
            )
            .conform(DatasetKind::Consensus.schema());

        Ok(vec![record])
    }
}

impl SourceAdapter for YahooConsensus {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn fetch(&self, query: &DatasetQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        let session = Session::new(self.timeout)?;
        let payload = session.get_json(&Self::url(query), None)?;
        let summary: QuoteSummaryResponse = serde_json::from_value(payload)
            .map_err(|e| SourceError::Schema(format!("quoteSummary response: {e}")))?;
        Self::parse(summary, query)
    }
}
