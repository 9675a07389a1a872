//! NSE archives CSV adapter.
//!
//! The archives host publishes day-wise bulk/block deal CSVs covering
//! every symbol. No cookie warm-up is needed, but the payload has to be
//! filtered client-side by symbol and date range. This is the second
//! rung of the deals chain: slower-moving than the live API, but far
//! more tolerant of cold requests.

use super::adapter::{SourceAdapter, SourceError};
use super::normalize::{normalize_row, FieldKind, FieldMapping};
use super::session::Session;
use crate::domain::{CanonicalField, DatasetQuery, DealType, FieldValue, NormalizedRecord};
use serde_json::{Map, Value};
use std::time::Duration;

const ARCHIVES_HOME: &str = "https://nsearchives.nseindia.com";

// Column headers as published in the archive CSVs.
const ARCHIVE_DEAL_FIELDS: &[FieldMapping] = &[
    FieldMapping {
        source_key: "Date",
        field: CanonicalField::Date,
        kind: FieldKind::Date,
    },
    FieldMapping {
        source_key: "Symbol",
        field: CanonicalField::Symbol,
        kind: FieldKind::Text,
    },
    FieldMapping {
        source_key: "Client Name",
        field: CanonicalField::Entity,
        kind: FieldKind::Text,
    },
    FieldMapping {
        source_key: "Buy / Sell",
        field: CanonicalField::BuySell,
        kind: FieldKind::Direction,
    },
    FieldMapping {
        source_key: "Quantity Traded",
        field: CanonicalField::Quantity,
        kind: FieldKind::Number,
    },
    FieldMapping {
        source_key: "Trade Price / Wght. Avg. Price",
        field: CanonicalField::Price,
        kind: FieldKind::Number,
    },
];

/// Bulk/block deals from the NSE archive CSVs.
pub struct NseArchives {
    timeout: Duration,
}

impl NseArchives {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn url(deal_type: DealType) -> String {
        let file = match deal_type {
            DealType::Bulk => "bulk.csv",
            DealType::Block => "block.csv",
        };
        format!("{ARCHIVES_HOME}/content/equities/{file}")
    }

    /// Parse the archive CSV, keeping rows for the queried symbol and range.
    ///
    /// Individual malformed rows are skipped; a body with no parseable
    /// header at all is a schema error.
    fn parse(body: &str, query: &DatasetQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(body.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| SourceError::Schema(format!("CSV header: {e}")))?
            .clone();
        if !headers.iter().any(|h| h.eq_ignore_ascii_case("symbol")) {
            return Err(SourceError::Schema("CSV has no Symbol column".into()));
        }

        let schema = crate::domain::DatasetKind::Deals.schema();
        let mut records = Vec::new();
        let mut skipped = 0usize;

        for row in reader.records() {
            let row = match row {
                Ok(row) => row,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };

            // Re-shape the CSV row as a JSON object so the shared
            // normalizer path applies.
            let mut raw = Map::new();
            for (header, value) in headers.iter().zip(row.iter()) {
                raw.insert(header.to_string(), Value::String(value.to_string()));
            }

            let record = normalize_row(&raw, ARCHIVE_DEAL_FIELDS, schema)
                .with(CanonicalField::Exchange, FieldValue::text("NSE"))
                .with(CanonicalField::Segment, FieldValue::text("Cash"));

            if record.get(CanonicalField::Symbol).as_text() != Some(query.symbol.as_str()) {
                continue;
            }
            let in_range = match record.get(CanonicalField::Date).as_date() {
                Some(date) => date >= query.from && date <= query.to,
                None => false,
            };
            if in_range {
                records.push(record);
            }
        }

        if skipped > 0 {
            eprintln!("WARNING: skipped {skipped} malformed archive CSV row(s)");
        }
        Ok(records)
    }
}

impl SourceAdapter for NseArchives {
    fn name(&self) -> &str {
        "nse_archives"
    }

    fn fetch(&self, query: &DatasetQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        let session = Session::new(self.timeout)?;
        let body = session.get_text(&Self::url(query.deal_type), None)?;
        Self::parse(&body, query)
    }
}
