//! Known currency symbols for an exchange
//!
//! Loaded once at startup and used as a cheap relevance gate: a message that
//! mentions no known symbol never reaches an extractor.

use crate::error::{RelayError, Result};
use crate::types::Exchange;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct CurrencyCatalog {
    symbols: BTreeSet<String>,
}

/// Exchange currency listing, `{ success, message, result: [{ Currency }] }`
#[derive(Debug, Deserialize)]
struct CurrencyListing {
    success: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: Option<Vec<ListedCurrency>>,
}

#[derive(Debug, Deserialize)]
struct ListedCurrency {
    #[serde(rename = "Currency")]
    currency: String,
}

impl CurrencyCatalog {
    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let symbols = symbols
            .into_iter()
            .map(|s| s.as_ref().trim().to_ascii_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self { symbols }
    }

    /// Load a catalog file: an exchange listing JSON document, or one symbol per line
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let catalog = if raw.trim_start().starts_with('{') {
            Self::from_listing(serde_json::from_str(&raw)?)?
        } else {
            Self::from_symbols(
                raw.lines()
                    .map(str::trim)
                    .filter(|line| !line.starts_with('#')),
            )
        };

        tracing::info!(
            "Loaded {} currencies from {}",
            catalog.len(),
            path.as_ref().display()
        );
        Ok(catalog)
    }

    /// Fetch the exchange's public currency listing
    pub async fn fetch(http: &reqwest::Client, base_url: &str, exchange: Exchange) -> Result<Self> {
        let url = match exchange {
            Exchange::Bittrex => format!(
                "{}/public/getcurrencies",
                base_url.trim_end_matches('/')
            ),
        };
        let listing: CurrencyListing = http.get(&url).send().await?.json().await?;
        let catalog = Self::from_listing(listing)?;

        tracing::info!("Fetched {} currencies from {}", catalog.len(), exchange);
        Ok(catalog)
    }

    fn from_listing(listing: CurrencyListing) -> Result<Self> {
        if !listing.success {
            return Err(RelayError::Remote(format!(
                "currency listing failed: {}",
                listing.message
            )));
        }
        let currencies = listing.result.unwrap_or_default();
        Ok(Self::from_symbols(currencies.iter().map(|c| c.currency.as_str())))
    }

    /// First known symbol mentioned in `text`, case-insensitively.
    ///
    /// "First" means earliest position in the text; a longer symbol wins a tie
    /// so `BTCD` is preferred over `BTC` at the same offset.
    pub fn contains(&self, text: &str) -> Option<&str> {
        let haystack = text.to_ascii_uppercase();
        self.symbols
            .iter()
            .filter_map(|symbol| haystack.find(symbol.as_str()).map(|pos| (pos, symbol)))
            .min_by(|(pa, a), (pb, b)| pa.cmp(pb).then(b.len().cmp(&a.len())))
            .map(|(_, symbol)| symbol.as_str())
    }

    pub fn is_known(&self, symbol: &str) -> bool {
        self.symbols.contains(&symbol.to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CurrencyCatalog {
        CurrencyCatalog::from_symbols(["BTC", "VIB", "SLR", "BCC", "NEO"])
    }

    #[test]
    fn test_case_insensitive_substring() {
        assert_eq!(catalog().contains("buy vib now"), Some("VIB"));
    }

    #[test]
    fn test_no_symbol_is_absent() {
        assert_eq!(catalog().contains("good morning everyone"), None);
    }

    #[test]
    fn test_earliest_mention_wins() {
        assert_eq!(catalog().contains("#SLR/BTC buy"), Some("SLR"));
        assert_eq!(catalog().contains("BTC dominance, watch NEO"), Some("BTC"));
    }

    #[test]
    fn test_longer_symbol_breaks_tie() {
        let catalog = CurrencyCatalog::from_symbols(["BTC", "BTCD"]);
        assert_eq!(catalog.contains("btcd pump"), Some("BTCD"));
    }

    #[test]
    fn test_symbols_normalized() {
        let catalog = CurrencyCatalog::from_symbols([" vib ", "", "neo"]);
        assert_eq!(catalog.len(), 2);
        assert!(catalog.is_known("VIB"));
        assert!(catalog.is_known("neo"));
    }

    #[test]
    fn test_listing_parse() {
        let listing: CurrencyListing = serde_json::from_str(
            r#"{"success":true,"message":"","result":[
                {"Currency":"BTC","CurrencyLong":"Bitcoin","IsActive":true},
                {"Currency":"VIB","CurrencyLong":"Viberate","IsActive":true}
            ]}"#,
        )
        .unwrap();
        let catalog = CurrencyCatalog::from_listing(listing).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.is_known("VIB"));
    }

    #[test]
    fn test_failed_listing_is_remote_error() {
        let listing: CurrencyListing =
            serde_json::from_str(r#"{"success":false,"message":"MAINTENANCE","result":null}"#)
                .unwrap();
        let err = CurrencyCatalog::from_listing(listing).unwrap_err();
        assert!(matches!(err, RelayError::Remote(ref m) if m.contains("MAINTENANCE")));
    }

    #[test]
    fn test_from_path_plain_text() {
        let path = std::env::temp_dir().join(format!("catalog-{}.txt", std::process::id()));
        std::fs::write(&path, "# bittrex\nBTC\nvib\n\nSLR\n").unwrap();
        let catalog = CurrencyCatalog::from_path(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(catalog.len(), 3);
        assert!(catalog.is_known("VIB"));
    }
}
