//! Built-in NSE symbol reference table.
//!
//! A small hand-maintained mapping from NSE symbols to display names,
//! covering the large-cap names the default watchlist scans. Unknown
//! symbols simply render as themselves.

/// Symbol → display name, alphabetical by symbol.
const NSE_NAMES: &[(&str, &str)] = &[
    ("ADANIENT", "Adani Enterprises"),
    ("ASIANPAINT", "Asian Paints"),
    ("AXISBANK", "Axis Bank"),
    ("BAJFINANCE", "Bajaj Finance"),
    ("BHARTIARTL", "Bharti Airtel"),
    ("HCLTECH", "HCL Technologies"),
    ("HDFCBANK", "HDFC Bank"),
    ("HINDUNILVR", "Hindustan Unilever"),
    ("ICICIBANK", "ICICI Bank"),
    ("INFY", "Infosys"),
    ("ITC", "ITC"),
    ("KOTAKBANK", "Kotak Mahindra Bank"),
    ("LT", "Larsen & Toubro"),
    ("MARUTI", "Maruti Suzuki India"),
    ("NTPC", "NTPC"),
    ("RELIANCE", "Reliance Industries"),
    ("SBIN", "State Bank of India"),
    ("SUNPHARMA", "Sun Pharmaceutical"),
    ("TATAMOTORS", "Tata Motors"),
    ("TATASTEEL", "Tata Steel"),
    ("TCS", "Tata Consultancy Services"),
    ("TITAN", "Titan Company"),
    ("ULTRACEMCO", "UltraTech Cement"),
    ("WIPRO", "Wipro"),
];

/// Display name for a symbol, if known.
pub fn display_name(symbol: &str) -> Option<&'static str> {
    NSE_NAMES
        .iter()
        .find(|(sym, _)| *sym == symbol)
        .map(|(_, name)| *name)
}

/// Default watchlist for batch scans.
pub fn default_watchlist() -> Vec<&'static str> {
    vec!["RELIANCE", "TCS", "HDFCBANK", "INFY", "ICICIBANK", "SBIN"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_symbol_resolves() {
        assert_eq!(display_name("RELIANCE"), Some("Reliance Industries"));
    }

    #[test]
    fn unknown_symbol_is_none() {
        assert_eq!(display_name("NOTASYMBOL"), None);
    }

    #[test]
    fn watchlist_symbols_all_have_names() {
        for sym in default_watchlist() {
            assert!(display_name(sym).is_some(), "{sym} missing a display name");
        }
    }
}
