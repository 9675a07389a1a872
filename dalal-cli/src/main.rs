//! Dalal CLI — deal disclosures, delivery history, news and
//! recommendations for Indian equities.
//!
//! Commands:
//! - `deals` — bulk/block deal disclosures for a symbol
//! - `history` — daily price/volume/deliverable history
//! - `news` — corporate announcements
//! - `recommend` — two-leg buy/hold/avoid recommendation per symbol
//! - `config init` — print the default TOML configuration
//!
//! Every command accepts `--offline` (deterministic synthetic data, no
//! network) and `--config <path>` (chain order and tunables).

use anyhow::Result;
use clap::{Parser, Subcommand};
use dalal_core::config::AppConfig;
use dalal_core::domain::{CanonicalField, DatasetKind, DatasetQuery, DealType};
use dalal_core::recommend::Recommender;
use dalal_core::scorer::notional_usd;
use dalal_core::sources::{AggregateResult, MarketData};
use dalal_core::universe;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dalal", about = "Dalal — market intelligence for Indian equities")]
struct Cli {
    /// Path to a TOML config file. Defaults are used when absent.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Offline mode: deterministic synthetic data, no network access.
    #[arg(long, global = true, default_value_t = false)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bulk/block deal disclosures for a symbol.
    Deals {
        /// NSE symbol (e.g., RELIANCE).
        symbol: String,

        /// Deal category: bulk or block.
        #[arg(long, default_value = "bulk")]
        deal_type: String,

        /// Trailing window in days (30/60/90 are conventional).
        #[arg(long, default_value_t = 30)]
        days: u32,

        /// Maximum rows to show.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Daily price/volume/deliverable history for a symbol.
    History {
        symbol: String,

        #[arg(long, default_value_t = 90)]
        days: u32,

        #[arg(long)]
        limit: Option<usize>,
    },
    /// Corporate announcements for a symbol.
    News {
        symbol: String,

        #[arg(long, default_value_t = 30)]
        days: u32,
    },
    /// Buy/hold/avoid recommendation per symbol.
    Recommend {
        /// Symbols to scan. Defaults to the built-in watchlist.
        symbols: Vec<String>,

        /// Emit JSON instead of the text card.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Configuration helpers.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the default configuration as TOML.
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };

    let market = if cli.offline {
        MarketData::offline(&config)
    } else {
        MarketData::from_config(&config)?
    };

    match cli.command {
        Commands::Deals {
            symbol,
            deal_type,
            days,
            limit,
        } => run_deals(&market, &config, &symbol, &deal_type, days, limit),
        Commands::History {
            symbol,
            days,
            limit,
        } => run_history(&market, &symbol, days, limit),
        Commands::News { symbol, days } => run_news(&market, &symbol, days),
        Commands::Recommend { symbols, json } => run_recommend(&market, symbols, json),
        Commands::Config { action } => match action {
            ConfigAction::Init => {
                println!("{}", AppConfig::default().to_toml()?);
                Ok(())
            }
        },
    }
}

fn parse_deal_type(raw: &str) -> Result<DealType> {
    match raw.to_ascii_lowercase().as_str() {
        "bulk" => Ok(DealType::Bulk),
        "block" => Ok(DealType::Block),
        other => anyhow::bail!("unknown deal type '{other}'. Valid: bulk, block"),
    }
}

/// Print the per-source failure reasons when a chain came back empty.
fn print_failures(result: &AggregateResult) {
    println!("No data returned. Sources tried:");
    for failure in &result.failures {
        println!("  {failure}");
    }
}

fn run_deals(
    market: &MarketData,
    config: &AppConfig,
    symbol: &str,
    deal_type: &str,
    days: u32,
    limit: Option<usize>,
) -> Result<()> {
    let mut query =
        DatasetQuery::trailing(symbol, days).with_deal_type(parse_deal_type(deal_type)?);
    if let Some(limit) = limit {
        query = query.with_limit(limit);
    }

    let result = market.fetch(DatasetKind::Deals, &query);
    if result.is_empty() {
        print_failures(&result);
        return Ok(());
    }

    println!(
        "{} deals for {} ({} to {}) — source: {}",
        query.deal_type.as_str(),
        query.symbol,
        query.from,
        query.to,
        result.provenance.as_deref().unwrap_or("?"),
    );
    println!(
        "{:<12} {:<34} {:<7} {:>12} {:>10} {:<10} {:<5}",
        "Date", "Entity", "Side", "Quantity", "Price", "Exchange", "Note"
    );
    println!("{}", "-".repeat(95));

    for rec in &result.records {
        let qty = rec.get(CanonicalField::Quantity).as_number();
        let price = rec.get(CanonicalField::Price).as_number();
        // Flag deals whose notional clears $10M at the configured rate.
        let large = match (qty, price) {
            (Some(q), Some(p)) => notional_usd(q, p, config.fetch.usd_inr) >= 10_000_000.0,
            _ => false,
        };
        println!(
            "{:<12} {:<34} {:<7} {:>12} {:>10} {:<10} {:<5}",
            rec.get(CanonicalField::Date).to_string(),
            truncate(&rec.get(CanonicalField::Entity).to_string(), 34),
            rec.get(CanonicalField::BuySell).to_string(),
            rec.get(CanonicalField::Quantity).to_string(),
            rec.get(CanonicalField::Price).to_string(),
            rec.get(CanonicalField::Exchange).to_string(),
            if large { "large" } else { "" },
        );
    }
    Ok(())
}

fn run_history(
    market: &MarketData,
    symbol: &str,
    days: u32,
    limit: Option<usize>,
) -> Result<()> {
    let mut query = DatasetQuery::trailing(symbol, days);
    if let Some(limit) = limit {
        query = query.with_limit(limit);
    }

    let result = market.fetch(DatasetKind::DeliveryHistory, &query);
    if result.is_empty() {
        print_failures(&result);
        return Ok(());
    }

    println!(
        "History for {} ({} rows) — source: {}",
        query.symbol,
        result.records.len(),
        result.provenance.as_deref().unwrap_or("?"),
    );
    println!(
        "{:<12} {:>10} {:>10} {:>10} {:>10} {:>12} {:>12} {:>8}",
        "Date", "Open", "High", "Low", "Close", "Volume", "DelivQty", "Deliv%"
    );
    println!("{}", "-".repeat(90));

    for rec in &result.records {
        println!(
            "{:<12} {:>10} {:>10} {:>10} {:>10} {:>12} {:>12} {:>8}",
            rec.get(CanonicalField::Date).to_string(),
            rec.get(CanonicalField::Open).to_string(),
            rec.get(CanonicalField::High).to_string(),
            rec.get(CanonicalField::Low).to_string(),
            rec.get(CanonicalField::Close).to_string(),
            rec.get(CanonicalField::Volume).to_string(),
            rec.get(CanonicalField::DeliveryQty).to_string(),
            rec.get(CanonicalField::DeliveryPct).to_string(),
        );
    }
    Ok(())
}

fn run_news(market: &MarketData, symbol: &str, days: u32) -> Result<()> {
    let query = DatasetQuery::trailing(symbol, days);
    let result = market.fetch(DatasetKind::News, &query);
    if result.is_empty() {
        print_failures(&result);
        return Ok(());
    }

    println!(
        "News for {} — source: {}",
        query.symbol,
        result.provenance.as_deref().unwrap_or("?"),
    );
    for rec in &result.records {
        println!(
            "[{}] ({}) {}",
            rec.get(CanonicalField::Date),
            rec.get(CanonicalField::Source),
            rec.get(CanonicalField::Headline),
        );
    }
    Ok(())
}

fn run_recommend(market: &MarketData, symbols: Vec<String>, json: bool) -> Result<()> {
    let symbols: Vec<String> = if symbols.is_empty() {
        universe::default_watchlist()
            .into_iter()
            .map(String::from)
            .collect()
    } else {
        symbols
    };

    let recommender = Recommender::new(market);
    let results: Vec<_> = symbols.iter().map(|s| recommender.recommend(s)).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    for rec in &results {
        println!();
        println!("=== {} ({}) ===", rec.symbol, rec.name);
        match rec.current_price {
            Some(price) => println!("Current price:  {price:.2}"),
            None => println!("Current price:  unavailable"),
        }

        if rec.intraday.available {
            let verdict = rec
                .intraday
                .recommendation
                .map(|v| v.to_string())
                .unwrap_or_default();
            println!("Intraday:       {verdict}");
            if let Some(m) = rec.intraday.momentum_pct {
                println!("  Momentum:     {m:+.2}%");
            }
            if let (Some(target), Some(stop)) = (rec.intraday.target, rec.intraday.stop_loss) {
                println!("  Target/Stop:  {target:.2} / {stop:.2}");
            }
        } else {
            println!("Intraday:       unavailable");
        }

        if rec.longterm.available {
            let verdict = rec
                .longterm
                .recommendation
                .map(|v| v.to_string())
                .unwrap_or_default();
            println!("Long-term:      {verdict}");
            if let Some(target) = rec.longterm.avg_target {
                let analysts = rec.longterm.num_analysts.unwrap_or(0);
                println!("  Avg target:   {target:.2} ({analysts} analysts)");
            }
        } else {
            println!("Long-term:      unavailable");
        }

        if let Some(error) = &rec.error {
            println!("WARNING: {error}");
        }
    }
    println!();
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
