//! Serializable application configuration.
//!
//! Chain priority order is a hand-maintained static configuration per
//! dataset — there is no adaptive reordering based on latency or
//! success history. The USD→INR rate used for notional bucketing is an
//! injected parameter here, never a constant buried in an adapter.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file: {0}")]
    Io(String),

    #[error("parse config TOML: {0}")]
    Parse(String),

    #[error("unknown source '{name}' in [chains] {dataset}")]
    UnknownSource { name: String, dataset: String },
}

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub chains: ChainConfig,
}

/// Network and cache tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Result memoization window in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// USD→INR conversion used for notional thresholds. A known
    /// staleness risk, which is exactly why it is configuration rather
    /// than a live lookup or a buried constant.
    #[serde(default = "default_usd_inr")]
    pub usd_inr: f64,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_usd_inr() -> f64 {
    83.0
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
            usd_inr: default_usd_inr(),
        }
    }
}

/// Ordered source names per dataset, first = highest priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    #[serde(default = "default_deals_chain")]
    pub deals: Vec<String>,

    #[serde(default = "default_history_chain")]
    pub history: Vec<String>,

    #[serde(default = "default_news_chain")]
    pub news: Vec<String>,

    #[serde(default = "default_consensus_chain")]
    pub consensus: Vec<String>,
}

fn default_deals_chain() -> Vec<String> {
    vec!["nse".into(), "nse_archives".into(), "bse".into()]
}

fn default_history_chain() -> Vec<String> {
    vec!["nse".into(), "yahoo".into()]
}

fn default_news_chain() -> Vec<String> {
    vec!["nse".into(), "bse".into()]
}

fn default_consensus_chain() -> Vec<String> {
    vec!["yahoo".into()]
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            deals: default_deals_chain(),
            history: default_history_chain(),
            news: default_news_chain(),
            consensus: default_consensus_chain(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize to TOML (for `config init`-style workflows).
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.fetch.timeout_secs)
    }

    pub fn cache_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.fetch.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.fetch.timeout_secs, 10);
        assert_eq!(cfg.fetch.cache_ttl_secs, 300);
        assert_eq!(cfg.chains.deals, vec!["nse", "nse_archives", "bse"]);
        assert_eq!(cfg.chains.consensus, vec!["yahoo"]);
    }

    #[test]
    fn toml_roundtrip() {
        let cfg = AppConfig::default();
        let toml_str = cfg.to_toml().unwrap();
        let parsed = AppConfig::from_toml(&toml_str).unwrap();
        assert_eq!(cfg, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
[fetch]
timeout_secs = 5

[chains]
deals = ["bse"]
"#,
        )
        .unwrap();
        assert_eq!(cfg.fetch.timeout_secs, 5);
        assert_eq!(cfg.fetch.cache_ttl_secs, 300);
        assert_eq!(cfg.chains.deals, vec!["bse"]);
        assert_eq!(cfg.chains.history, vec!["nse", "yahoo"]);
    }

    #[test]
    fn garbage_toml_is_a_parse_error() {
        let err = AppConfig::from_toml("chains = 7").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
