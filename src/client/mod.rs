//! Exchange ticker clients
//!
//! - `TickerClient`: last traded price for a pair on one exchange
//! - `MarketPriceLookup`: routes a lookup to the client for the source's exchange
//! - `MockTicker`: canned prices for tests and offline runs

mod bittrex;
pub mod mock;

pub use bittrex::BittrexClient;
pub use mock::MockTicker;

use crate::error::{RelayError, Result};
use crate::types::{CoinPair, Exchange};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

/// Public ticker of a single exchange
#[async_trait]
pub trait TickerClient: Send + Sync {
    fn exchange(&self) -> Exchange;

    async fn last_price(&self, pair: &CoinPair) -> Result<Decimal>;
}

/// Per-exchange ticker routing
#[derive(Clone, Default)]
pub struct MarketPriceLookup {
    clients: HashMap<Exchange, Arc<dyn TickerClient>>,
}

impl MarketPriceLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(mut self, client: Arc<dyn TickerClient>) -> Self {
        self.clients.insert(client.exchange(), client);
        self
    }

    pub async fn last_price(&self, exchange: Exchange, pair: &CoinPair) -> Result<Decimal> {
        let client = self.clients.get(&exchange).ok_or_else(|| {
            RelayError::Config(format!("No ticker client for exchange: {}", exchange))
        })?;
        client.last_price(pair).await
    }
}
