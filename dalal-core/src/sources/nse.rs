//! NSE live API adapters.
//!
//! The NSE site serves JSON from `/api/*` endpoints, but only to
//! sessions that already carry the cookies set by the public homepage.
//! Each fetch therefore warms a fresh session first, then issues the
//! API call with a Referer header. The NSE is the official registry for
//! deal disclosures, so these adapters sit first in every default chain.

use super::adapter::{SourceAdapter, SourceError};
use super::normalize::{normalize_row, FieldKind, FieldMapping};
use super::session::Session;
use crate::domain::{CanonicalField, DatasetQuery, DealType, FieldValue, NormalizedRecord};
use serde_json::Value;
use std::time::Duration;

const NSE_HOME: &str = "https://www.nseindia.com";

/// NSE uses dd-mm-yyyy in its historical query strings.
fn nse_date(date: chrono::NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

fn warm_session(timeout: Duration) -> Result<Session, SourceError> {
    let session = Session::new(timeout)?;
    session.warm_up(NSE_HOME)?;
    Ok(session)
}

/// Pull the `data` row array out of an NSE historical response.
fn data_rows(payload: &Value) -> Result<&Vec<Value>, SourceError> {
    payload
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| SourceError::Schema("missing 'data' array".into()))
}

// ── Bulk/block deals ────────────────────────────────────────────────

const NSE_DEAL_FIELDS: &[FieldMapping] = &[
    FieldMapping {
        source_key: "BD_SYMBOL",
        field: CanonicalField::Symbol,
        kind: FieldKind::Text,
    },
    FieldMapping {
        source_key: "BD_CLIENT_NAME",
        field: CanonicalField::Entity,
        kind: FieldKind::Text,
    },
    FieldMapping {
        source_key: "BD_BUY_SELL",
        field: CanonicalField::BuySell,
        kind: FieldKind::Direction,
    },
    FieldMapping {
        source_key: "BD_QTY_TRD",
        field: CanonicalField::Quantity,
        kind: FieldKind::Number,
    },
    FieldMapping {
        source_key: "BD_TP_WATP",
        field: CanonicalField::Price,
        kind: FieldKind::Number,
    },
    FieldMapping {
        source_key: "BD_DT_DATE",
        field: CanonicalField::Date,
        kind: FieldKind::Date,
    },
];

/// Bulk/block deal disclosures from the NSE historical API.
pub struct NseDeals {
    timeout: Duration,
}

impl NseDeals {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn url(query: &DatasetQuery) -> String {
        let path = match query.deal_type {
            DealType::Bulk => "bulk-deals",
            DealType::Block => "block-deals",
        };
        format!(
            "{NSE_HOME}/api/historical/{path}?symbol={}&from={}&to={}",
            query.symbol,
            nse_date(query.from),
            nse_date(query.to),
        )
    }

    fn parse(payload: &Value, query: &DatasetQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        let schema = crate::domain::DatasetKind::Deals.schema();
        let mut records = Vec::new();
        for row in data_rows(payload)? {
            let Some(obj) = row.as_object() else {
                return Err(SourceError::Schema("deal row is not an object".into()));
            };
            let record = normalize_row(obj, NSE_DEAL_FIELDS, schema)
                .with(CanonicalField::Exchange, FieldValue::text("NSE"))
                .with(CanonicalField::Segment, FieldValue::text("Cash"));
            // The API occasionally leaks other symbols into a
            // symbol-scoped query; keep only what was asked for.
            if record.get(CanonicalField::Symbol).as_text() == Some(query.symbol.as_str()) {
                records.push(record);
            }
        }
        Ok(records)
    }
}

impl SourceAdapter for NseDeals {
    fn name(&self) -> &str {
        "nse"
    }

    fn fetch(&self, query: &DatasetQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        let session = warm_session(self.timeout)?;
        let payload = session.get_json(&Self::url(query), Some(NSE_HOME))?;
        Self::parse(&payload, query)
    }
}

// ── Price / volume / deliverable history ────────────────────────────

const NSE_HISTORY_FIELDS: &[FieldMapping] = &[
    FieldMapping {
        source_key: "CH_TIMESTAMP",
        field: CanonicalField::Date,
        kind: FieldKind::Date,
    },
    FieldMapping {
        source_key: "CH_OPENING_PRICE",
        field: CanonicalField::Open,
        kind: FieldKind::Number,
    },
    FieldMapping {
        source_key: "CH_TRADE_HIGH_PRICE",
        field: CanonicalField::High,
        kind: FieldKind::Number,
    },
    FieldMapping {
        source_key: "CH_TRADE_LOW_PRICE",
        field: CanonicalField::Low,
        kind: FieldKind::Number,
    },
    FieldMapping {
        source_key: "CH_CLOSING_PRICE",
        field: CanonicalField::Close,
        kind: FieldKind::Number,
    },
    FieldMapping {
        source_key: "CH_TOT_TRADED_QTY",
        field: CanonicalField::Volume,
        kind: FieldKind::Number,
    },
    FieldMapping {
        source_key: "COP_DELIV_QTY",
        field: CanonicalField::DeliveryQty,
        kind: FieldKind::Number,
    },
    FieldMapping {
        source_key: "COP_DELIV_PERC",
        field: CanonicalField::DeliveryPct,
        kind: FieldKind::Number,
    },
];

/// Daily price/volume/deliverable history from the NSE security archives.
pub struct NseHistory {
    timeout: Duration,
}

impl NseHistory {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn url(query: &DatasetQuery) -> String {
        format!(
            "{NSE_HOME}/api/historical/securityArchives?symbol={}&dataType=priceVolumeDeliverable&series=EQ&from={}&to={}",
            query.symbol,
            nse_date(query.from),
            nse_date(query.to),
        )
    }

    fn parse(payload: &Value) -> Result<Vec<NormalizedRecord>, SourceError> {
        let schema = crate::domain::DatasetKind::DeliveryHistory.schema();
        let mut records = Vec::new();
        for row in data_rows(payload)? {
            let Some(obj) = row.as_object() else {
                return Err(SourceError::Schema("history row is not an object".into()));
            };
            records.push(normalize_row(obj, NSE_HISTORY_FIELDS, schema));
        }
        // Archives arrive newest-first; callers expect ascending dates.
        records.sort_by_key(|r| r.get(CanonicalField::Date).as_date());
        Ok(records)
    }
}

impl SourceAdapter for NseHistory {
    fn name(&self) -> &str {
        "nse"
    }

    fn fetch(&self, query: &DatasetQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        let session = warm_session(self.timeout)?;
        let payload = session.get_json(&Self::url(query), Some(NSE_HOME))?;
        Self::parse(&payload)
    }
}

// ── Corporate announcements ─────────────────────────────────────────

const NSE_ANNOUNCEMENT_FIELDS: &[FieldMapping] = &[
    FieldMapping {
        source_key: "symbol",
        field: CanonicalField::Symbol,
        kind: FieldKind::Text,
    },
    FieldMapping {
        source_key: "desc",
        field: CanonicalField::Headline,
        kind: FieldKind::Text,
    },
    FieldMapping {
        source_key: "an_dt",
        field: CanonicalField::Date,
        kind: FieldKind::Date,
    },
    FieldMapping {
        source_key: "attchmntFile",
        field: CanonicalField::Url,
        kind: FieldKind::Text,
    },
];

/// Corporate announcements from the NSE, used as the primary news feed.
pub struct NseAnnouncements {
    timeout: Duration,
}

impl NseAnnouncements {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn url(query: &DatasetQuery) -> String {
        format!(
            "{NSE_HOME}/api/corporate-announcements?index=equities&symbol={}",
            query.symbol
        )
    }

    fn parse(payload: &Value, query: &DatasetQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        // This endpoint returns a bare array, not a {data: [...]} wrapper.
        let rows = payload
            .as_array()
            .ok_or_else(|| SourceError::Schema("announcements payload is not an array".into()))?;

        let schema = crate::domain::DatasetKind::News.schema();
        let mut records = Vec::new();
        for row in rows {
            let Some(obj) = row.as_object() else {
                return Err(SourceError::Schema("announcement row is not an object".into()));
            };
            let record = normalize_row(obj, NSE_ANNOUNCEMENT_FIELDS, schema)
                .with(CanonicalField::Source, FieldValue::text("NSE"));
            // The feed is not range-scoped upstream; filter here. Rows
            // with an unparseable date are kept rather than guessed away.
            let in_range = match record.get(CanonicalField::Date).as_date() {
                Some(date) => date >= query.from && date <= query.to,
                None => true,
            };
            if in_range {
                records.push(record);
            }
        }
        Ok(records)
    }
}

impl SourceAdapter for NseAnnouncements {
    fn name(&self) -> &str {
        "nse"
    }

    fn fetch(&self, query: &DatasetQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        let session = warm_session(self.timeout)?;
        let payload = session.get_json(&Self::url(query), Some(NSE_HOME))?;
        Self::parse(&payload, query)
    }
}
