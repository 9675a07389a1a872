//! Rule-based recommendation scoring.
//!
//! A pure weighted sum of graded signals: no I/O, no failure modes.
//! Missing inputs contribute a neutral grade rather than an error, so
//! a thin data day degrades the score toward Hold instead of breaking
//! the pipeline.

use serde::{Deserialize, Serialize};

/// Investment horizon the score is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Horizon {
    Intraday,
    LongTerm,
}

/// Three-way verdict derived from the bounded score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Buy,
    Hold,
    Avoid,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Buy => "BUY",
            Verdict::Hold => "HOLD",
            Verdict::Avoid => "AVOID",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized technical/fundamental inputs. All optional — absent
/// signals grade neutral.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Snapshot {
    /// Close-to-close change over the recent window, in percent.
    pub momentum_pct: Option<f64>,
    /// Average deliverable share of traded volume, in percent.
    pub delivery_pct: Option<f64>,
    /// Recent-vs-prior average volume, as a ratio minus one.
    pub volume_trend: Option<f64>,
    /// Analyst mean target vs. current price, in percent.
    pub upside_pct: Option<f64>,
    /// Number of covering analysts.
    pub analyst_count: Option<f64>,
}

/// Bounded score plus its verdict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    /// In [0, 10].
    pub value: f64,
    pub verdict: Verdict,
}

/// Score at or above this is a Buy.
pub const BUY_THRESHOLD: f64 = 6.5;
/// Score below this is an Avoid.
pub const AVOID_THRESHOLD: f64 = 4.0;

fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

/// Grade an optional signal into [0, 1], neutral when absent.
fn grade(signal: Option<f64>, to_unit: impl Fn(f64) -> f64) -> f64 {
    signal.map(|v| clamp01(to_unit(v))).unwrap_or(0.5)
}

/// Compute the weighted score for a snapshot and horizon.
pub fn score(snapshot: &Snapshot, horizon: Horizon) -> Score {
    let momentum_scale = match horizon {
        Horizon::Intraday => 10.0,
        Horizon::LongTerm => 40.0,
    };
    let momentum = grade(snapshot.momentum_pct, |m| 0.5 + m / momentum_scale);
    let delivery = grade(snapshot.delivery_pct, |d| d / 100.0);
    let volume = grade(snapshot.volume_trend, |t| 0.5 + t / 2.0);
    let upside = grade(snapshot.upside_pct, |u| 0.5 + u / 40.0);
    let analysts = grade(snapshot.analyst_count, |c| c / 20.0);

    let weighted = match horizon {
        Horizon::Intraday => 0.5 * momentum + 0.3 * delivery + 0.2 * volume,
        Horizon::LongTerm => 0.6 * upside + 0.2 * analysts + 0.2 * momentum,
    };

    let value = 10.0 * weighted;
    Score {
        value,
        verdict: verdict_for(value),
    }
}

fn verdict_for(value: f64) -> Verdict {
    if value >= BUY_THRESHOLD {
        Verdict::Buy
    } else if value < AVOID_THRESHOLD {
        Verdict::Avoid
    } else {
        Verdict::Hold
    }
}

/// Deal notional converted at the injected USD→INR rate.
pub fn notional_usd(quantity: f64, price: f64, usd_inr: f64) -> f64 {
    (quantity * price) / usd_inr
}
