//! Mock ticker for testing
//!
//! Serves canned last prices keyed by market name (`MAIN-ALT`) and records
//! every lookup so tests can assert whether the network path was taken.

use super::TickerClient;
use crate::error::{RelayError, Result};
use crate::types::{CoinPair, Exchange};
use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashMap;

pub struct MockTicker {
    exchange: Exchange,
    prices: HashMap<String, Decimal>,
    calls: Mutex<Vec<String>>,
}

impl MockTicker {
    pub fn new() -> Self {
        Self {
            exchange: Exchange::Bittrex,
            prices: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_price(mut self, market: &str, price: Decimal) -> Self {
        self.prices.insert(market.to_string(), price);
        self
    }

    /// Markets looked up so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl Default for MockTicker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TickerClient for MockTicker {
    fn exchange(&self) -> Exchange {
        self.exchange
    }

    async fn last_price(&self, pair: &CoinPair) -> Result<Decimal> {
        let market = pair.market_name();
        self.calls.lock().push(market.clone());
        self.prices
            .get(&market)
            .copied()
            .ok_or_else(|| RelayError::Remote(format!("INVALID_MARKET {}", market)))
    }
}
