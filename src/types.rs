//! Core domain types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quote currency every registered format trades against
pub const DEFAULT_MAIN: &str = "BTC";

/// Exchange a source's signals are meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    Bittrex,
}

impl Exchange {
    pub fn id(&self) -> &'static str {
        match self {
            Exchange::Bittrex => "bittrex",
        }
    }

    /// Human-facing market page for a pair
    pub fn market_url(&self, pair: &CoinPair) -> String {
        match self {
            Exchange::Bittrex => format!(
                "https://bittrex.com/Market/Index?MarketName={}",
                pair.market_name()
            ),
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Base/quote pair, both symbols uppercase `[A-Z]{3,5}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoinPair {
    pub alt: String,
    pub main: String,
}

impl CoinPair {
    /// Build a pair, uppercasing both symbols. `None` if either is not 3-5 ASCII letters.
    pub fn new(alt: &str, main: &str) -> Option<Self> {
        let alt = alt.trim().to_ascii_uppercase();
        let main = main.trim().to_ascii_uppercase();
        if is_symbol(&alt) && is_symbol(&main) {
            Some(Self { alt, main })
        } else {
            None
        }
    }

    /// Pair against the default quote currency
    pub fn btc(alt: &str) -> Option<Self> {
        Self::new(alt, DEFAULT_MAIN)
    }

    /// Exchange market key, `MAIN-ALT`
    pub fn market_name(&self) -> String {
        format!("{}-{}", self.main, self.alt)
    }
}

/// Displays as `ALT-MAIN`
impl fmt::Display for CoinPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.alt, self.main)
    }
}

fn is_symbol(s: &str) -> bool {
    (3..=5).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_uppercase())
}

/// Structured trading signal extracted from a channel message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub coin_pair: CoinPair,
    pub buy_price: Decimal,
    /// Sell targets in the order they appeared
    pub targets: Vec<Decimal>,
    pub stop_loss: Decimal,
}

/// Inbound channel message, consumed once by the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMessage {
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Channel username, when the channel has one
    pub source_id: Option<String>,
    /// Channel title
    pub source_display_name: String,
}

impl RawMessage {
    pub fn new(
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
        source_id: Option<String>,
        source_display_name: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            timestamp,
            source_id,
            source_display_name: source_display_name.into(),
        }
    }

    /// Only messages with a non-blank body enter the pipeline
    pub fn has_body(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Fixed 8-place price notation
pub fn format_price(value: Decimal) -> String {
    format!("{:.8}", value.round_dp(8))
}

/// Fixed 2-place percentage notation (no `%` sign)
pub fn format_pct(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}
