//! Canonical field vocabulary and typed scalar values.
//!
//! Every source adapter maps its provider-specific payload keys onto
//! `CanonicalField`, so downstream code never touches raw provider
//! field names. Missing data is an explicit `FieldValue::Missing`,
//! never an absent key.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Canonical column names across all datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CanonicalField {
    // Deal disclosures
    Symbol,
    Entity,
    BuySell,
    Quantity,
    Price,
    Date,
    Exchange,
    Segment,
    // Price / delivery history
    Open,
    High,
    Low,
    Close,
    Volume,
    DeliveryQty,
    DeliveryPct,
    // News
    Headline,
    Source,
    Url,
    // Analyst consensus
    TargetPrice,
    AnalystCount,
    Rating,
}

impl CanonicalField {
    /// Column header used when rendering tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Symbol => "Symbol",
            CanonicalField::Entity => "Entity",
            CanonicalField::BuySell => "BuySell",
            CanonicalField::Quantity => "Quantity",
            CanonicalField::Price => "Price",
            CanonicalField::Date => "Date",
            CanonicalField::Exchange => "Exchange",
            CanonicalField::Segment => "Segment",
            CanonicalField::Open => "Open",
            CanonicalField::High => "High",
            CanonicalField::Low => "Low",
            CanonicalField::Close => "Close",
            CanonicalField::Volume => "Volume",
            CanonicalField::DeliveryQty => "DeliveryQty",
            CanonicalField::DeliveryPct => "DeliveryPct",
            CanonicalField::Headline => "Headline",
            CanonicalField::Source => "Source",
            CanonicalField::Url => "Url",
            CanonicalField::TargetPrice => "TargetPrice",
            CanonicalField::AnalystCount => "AnalystCount",
            CanonicalField::Rating => "Rating",
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed scalar held by a normalized record.
///
/// `Missing` is the explicit sentinel for absent or unparseable values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Missing,
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n:.2}")
                }
            }
            FieldValue::Date(d) => write!(f, "{d}"),
            FieldValue::Missing => f.write_str("-"),
        }
    }
}

/// Trade direction, normalized to a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuySell {
    Buy,
    Sell,
    Unknown,
}

impl BuySell {
    /// Map provider-specific abbreviations onto the closed set.
    ///
    /// `P` is "purchase" in BSE disclosures. Anything unrecognized maps
    /// to `Unknown` rather than being dropped.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "B" | "BUY" | "P" | "PURCHASE" => BuySell::Buy,
            "S" | "SELL" => BuySell::Sell,
            _ => BuySell::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuySell::Buy => "BUY",
            BuySell::Sell => "SELL",
            BuySell::Unknown => "UNKNOWN",
        }
    }
}
