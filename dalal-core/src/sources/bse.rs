//! BSE API adapters.
//!
//! BSE's JSON endpoints need no cookie warm-up but reject requests
//! without a `Referer: https://www.bseindia.com/` header, and wrap every
//! payload in a `{"Table": [...]}` envelope. Deal rows are keyed by
//! scrip name rather than NSE-style symbols, so matching is done by
//! case-insensitive containment against the queried symbol.

use super::adapter::{SourceAdapter, SourceError};
use super::normalize::{normalize_row, FieldKind, FieldMapping};
use super::session::Session;
use crate::domain::{CanonicalField, DatasetQuery, DealType, FieldValue, NormalizedRecord};
use serde_json::Value;
use std::time::Duration;

const BSE_API: &str = "https://api.bseindia.com/BseIndiaAPI/api";
const BSE_REFERER: &str = "https://www.bseindia.com/";

/// Unwrap the `{"Table": [...]}` envelope.
fn table_rows(payload: &Value) -> Result<&Vec<Value>, SourceError> {
    payload
        .get("Table")
        .and_then(Value::as_array)
        .ok_or_else(|| SourceError::Schema("missing 'Table' array".into()))
}

/// Request query strings take compact yyyymmdd dates.
fn bse_date(date: chrono::NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

// ── Bulk/block deals ────────────────────────────────────────────────

const BSE_DEAL_FIELDS: &[FieldMapping] = &[
    FieldMapping {
        source_key: "DealDate",
        field: CanonicalField::Date,
        kind: FieldKind::Date,
    },
    FieldMapping {
        source_key: "ScripName",
        field: CanonicalField::Symbol,
        kind: FieldKind::Text,
    },
    FieldMapping {
        source_key: "ClientName",
        field: CanonicalField::Entity,
        kind: FieldKind::Text,
    },
    FieldMapping {
        source_key: "BuySell",
        field: CanonicalField::BuySell,
        kind: FieldKind::Direction,
    },
    FieldMapping {
        source_key: "QtyShares",
        field: CanonicalField::Quantity,
        kind: FieldKind::Number,
    },
    FieldMapping {
        source_key: "AvgPrice",
        field: CanonicalField::Price,
        kind: FieldKind::Number,
    },
];

/// Bulk/block deal disclosures from the BSE API, the last rung of the
/// deals chain.
pub struct BseDeals {
    timeout: Duration,
}

impl BseDeals {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn url(query: &DatasetQuery) -> String {
        let flag = match query.deal_type {
            DealType::Bulk => "bulk",
            DealType::Block => "block",
        };
        format!(
            "{BSE_API}/BulkBlockDataNew/w?flag={flag}&Fdate={}&Tdate={}",
            bse_date(query.from),
            bse_date(query.to),
        )
    }

    fn parse(payload: &Value, query: &DatasetQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        let schema = crate::domain::DatasetKind::Deals.schema();
        let needle = query.symbol.to_ascii_uppercase();
        let mut records = Vec::new();

        for row in table_rows(payload)? {
            let Some(obj) = row.as_object() else {
                return Err(SourceError::Schema("deal row is not an object".into()));
            };
            let record = normalize_row(obj, BSE_DEAL_FIELDS, schema)
                .with(CanonicalField::Exchange, FieldValue::text("BSE"))
                .with(CanonicalField::Segment, FieldValue::text("Cash"));

            // The feed covers every scrip; keep rows whose scrip name
            // mentions the queried symbol.
            let matches = record
                .get(CanonicalField::Symbol)
                .as_text()
                .map(|name| name.to_ascii_uppercase().contains(&needle))
                .unwrap_or(false);
            if matches {
                records.push(record);
            }
        }
        Ok(records)
    }
}

impl SourceAdapter for BseDeals {
    fn name(&self) -> &str {
        "bse"
    }

    fn fetch(&self, query: &DatasetQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        let session = Session::new(self.timeout)?;
        let payload = session.get_json(&Self::url(query), Some(BSE_REFERER))?;
        Self::parse(&payload, query)
    }
}

// ── Announcements ───────────────────────────────────────────────────

const BSE_NEWS_FIELDS: &[FieldMapping] = &[
    FieldMapping {
        source_key: "NEWSSUB",
        field: CanonicalField::Headline,
        kind: FieldKind::Text,
    },
    FieldMapping {
        source_key: "NEWS_DT",
        field: CanonicalField::Date,
        kind: FieldKind::Date,
    },
    FieldMapping {
        source_key: "ATTACHMENTNAME",
        field: CanonicalField::Url,
        kind: FieldKind::Text,
    },
];

/// Corporate announcements from the BSE API, the news-chain fallback.
pub struct BseAnnouncements {
    timeout: Duration,
}

impl BseAnnouncements {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn url(query: &DatasetQuery) -> String {
        format!(
            "{BSE_API}/AnnGetData/w?strCat=-1&strScrip={}&strPrevDate={}&strToDate={}",
            query.symbol,
            bse_date(query.from),
            bse_date(query.to),
        )
    }

    fn parse(payload: &Value, query: &DatasetQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        let schema = crate::domain::DatasetKind::News.schema();
        let mut records = Vec::new();
        for row in table_rows(payload)? {
            let Some(obj) = row.as_object() else {
                return Err(SourceError::Schema("announcement row is not an object".into()));
            };
            records.push(
                normalize_row(obj, BSE_NEWS_FIELDS, schema)
                    .with(CanonicalField::Symbol, FieldValue::text(&query.symbol))
                    .with(CanonicalField::Source, FieldValue::text("BSE")),
            );
        }
        Ok(records)
    }
}

impl SourceAdapter for BseAnnouncements {
    fn name(&self) -> &str {
        "bse"
    }

    fn fetch(&self, query: &DatasetQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        let session = Session::new(self.timeout)?;
        let payload = session.get_json(&Self::url(query), Some(BSE_REFERER))?;
        Self::parse(&payload, query)
    }
}
