//! Response normalizer — provider rows to canonical records.
//!
//! Each provider declares a static [`FieldMapping`] table; `normalize_row`
//! applies it to one raw JSON object and conforms the result to the
//! dataset schema. Coercion never fails: anything unparseable becomes
//! `FieldValue::Missing`.

use crate::domain::{BuySell, CanonicalField, FieldValue, NormalizedRecord};
use chrono::NaiveDate;
use serde_json::Value;

/// How a mapped source field is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Date,
    /// Buy/sell flag, normalized onto the closed {BUY, SELL, UNKNOWN} set.
    Direction,
}

/// One entry of a per-provider field-name mapping table.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    pub source_key: &'static str,
    pub field: CanonicalField,
    pub kind: FieldKind,
}

/// Date formats tried in order. Day-first formats are listed explicitly;
/// an input matching none of these becomes `Missing`, never a guess.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d-%b-%Y",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%d %b %Y",
];

/// Datetime formats some providers use for plain dates; the time part
/// is discarded.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%d-%b-%Y %H:%M:%S"];

/// Parse a provider-formatted decimal.
///
/// Handles Indian-style comma grouping (`"12,34,567"`), parenthesized
/// negatives (`"(500)"`), and the usual placeholder strings. Returns
/// `None` for anything unparseable.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.to_ascii_uppercase().as_str() {
        "-" | "NA" | "N/A" | "NIL" | "NULL" => return None,
        _ => {}
    }

    let (body, negated) = if trimmed.starts_with('(') && trimmed.ends_with(')') {
        (&trimmed[1..trimmed.len() - 1], true)
    } else {
        (trimmed, false)
    };

    let cleaned: String = body.chars().filter(|c| *c != ',').collect();
    let value: f64 = cleaned.trim().parse().ok()?;
    Some(if negated { -value } else { value })
}

/// Parse a provider-formatted date, trying each known format in order.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Coerce one raw JSON value according to the declared field kind.
pub fn coerce(value: &Value, kind: FieldKind) -> FieldValue {
    match kind {
        FieldKind::Text => match value {
            Value::String(s) if !s.trim().is_empty() => FieldValue::text(s.trim()),
            Value::Number(n) => FieldValue::text(n.to_string()),
            _ => FieldValue::Missing,
        },
        FieldKind::Number => match value {
            Value::Number(n) => n.as_f64().map(FieldValue::Number).unwrap_or(FieldValue::Missing),
            Value::String(s) => parse_number(s)
                .map(FieldValue::Number)
                .unwrap_or(FieldValue::Missing),
            _ => FieldValue::Missing,
        },
        FieldKind::Date => match value {
            Value::String(s) => parse_date(s).map(FieldValue::Date).unwrap_or(FieldValue::Missing),
            _ => FieldValue::Missing,
        },
        FieldKind::Direction => match value {
            Value::String(s) => FieldValue::text(BuySell::from_raw(s).as_str()),
            _ => FieldValue::text(BuySell::Unknown.as_str()),
        },
    }
}

/// Normalize one raw provider row.
///
/// Mapped keys are coerced; unmapped source keys are dropped; schema
/// fields absent from the source come back as `Missing`.
pub fn normalize_row(
    raw: &serde_json::Map<String, Value>,
    mappings: &[FieldMapping],
    schema: &[CanonicalField],
) -> NormalizedRecord {
    let mut record = NormalizedRecord::new();
    for mapping in mappings {
        if let Some(value) = raw.get(mapping.source_key) {
            record.set(mapping.field, coerce(value, mapping.kind));
        }
    }
    record.conform(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DatasetKind;
    use serde_json::json;

    #[test]
    fn number_coercion_handles_commas_and_parens() {
        assert_eq!(parse_number("1,234"), Some(1234.0));
        assert_eq!(parse_number("12,34,567"), Some(1234567.0));
        assert_eq!(parse_number("(500)"), Some(-500.0));
        assert_eq!(parse_number("2930.55"), Some(2930.55));
        assert_eq!(parse_number(" 42 "), Some(42.0));
    }

    #[test]
    fn number_coercion_never_errors() {
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("NA"), None);
        assert_eq!(parse_number("(abc)"), None);
    }

    #[test]
    fn date_coercion_accepts_known_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        assert_eq!(parse_date("2024-06-28"), Some(expected));
        assert_eq!(parse_date("28-Jun-2024"), Some(expected));
        assert_eq!(parse_date("28-JUN-2024"), Some(expected));
        assert_eq!(parse_date("28-06-2024"), Some(expected));
        assert_eq!(parse_date("28/06/2024"), Some(expected));
        assert_eq!(parse_date("2024-06-28T00:00:00"), Some(expected));
        assert_eq!(parse_date("28-Jun-2024 15:30:00"), Some(expected));
    }

    #[test]
    fn ambiguous_or_garbage_dates_become_missing() {
        assert_eq!(parse_date("28th June"), None);
        assert_eq!(parse_date("tomorrow"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn normalize_row_maps_drops_and_fills() {
        let raw = json!({
            "BD_SYMBOL": "RELIANCE",
            "BD_CLIENT_NAME": "GRAVITON RESEARCH CAPITAL LLP",
            "BD_BUY_SELL": "B",
            "BD_QTY_TRD": "1,50,000",
            "BD_TP_WATP": "2,930.55",
            "BD_DT_DATE": "28-Jun-2024",
            "BD_REMARKS": "ignored upstream noise",
        });
        let mappings = &[
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

        let record = normalize_row(
            raw.as_object().unwrap(),
            mappings,
            DatasetKind::Deals.schema(),
        );

        assert!(record.matches_schema(DatasetKind::Deals.schema()));
        assert_eq!(record.get(CanonicalField::Quantity).as_number(), Some(150000.0));
        assert_eq!(record.get(CanonicalField::BuySell).as_text(), Some("BUY"));
        // Exchange/Segment not in the payload — explicit sentinel.
        assert!(record.get(CanonicalField::Exchange).is_missing());
        // BD_REMARKS had no mapping — dropped entirely.
        assert!(!record.contains(CanonicalField::Headline));
    }

    #[test]
    fn parse_failures_become_missing_not_errors() {
        let raw = json!({ "BD_QTY_TRD": "abc", "BD_DT_DATE": "someday" });
        let mappings = &[
            FieldMapping {
                source_key: "BD_QTY_TRD",
                field: CanonicalField::Quantity,
                kind: FieldKind::Number,
            },
            FieldMapping {
                source_key: "BD_DT_DATE",
                field: CanonicalField::Date,
                kind: FieldKind::Date,
            },
        ];
        let record = normalize_row(
            raw.as_object().unwrap(),
            mappings,
            DatasetKind::Deals.schema(),
        );
        assert!(record.get(CanonicalField::Quantity).is_missing());
        assert!(record.get(CanonicalField::Date).is_missing());
    }
}
