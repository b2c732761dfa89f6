//! Bittrex public ticker client

use super::TickerClient;
use crate::error::{RelayError, Result};
use crate::types::{CoinPair, Exchange};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Bittrex public API client
pub struct BittrexClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TickerResponse {
    success: bool,
    #[serde(default)]
    message: String,
    result: Option<Ticker>,
}

#[derive(Debug, Deserialize)]
struct Ticker {
    #[serde(rename = "Last")]
    last: Option<f64>,
}

impl BittrexClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn ticker_url(&self, pair: &CoinPair) -> String {
        format!(
            "{}/public/getticker?market={}",
            self.base_url,
            pair.market_name()
        )
    }
}

#[async_trait]
impl TickerClient for BittrexClient {
    fn exchange(&self) -> Exchange {
        Exchange::Bittrex
    }

    async fn last_price(&self, pair: &CoinPair) -> Result<Decimal> {
        let url = self.ticker_url(pair);
        tracing::debug!("Fetching Bittrex ticker: {}", url);

        let body = self.http.get(&url).send().await?.text().await?;
        parse_ticker(&body)
    }
}

fn parse_ticker(body: &str) -> Result<Decimal> {
    let resp: TickerResponse = serde_json::from_str(body)?;
    if !resp.success {
        return Err(RelayError::Remote(format!(
            "Error getting Bittrex ticker: {}",
            resp.message
        )));
    }

    let last = resp
        .result
        .and_then(|t| t.last)
        .ok_or_else(|| RelayError::Remote("Bittrex ticker has no last price".to_string()))?;

    Decimal::try_from(last)
        .map_err(|e| RelayError::Remote(format!("Bittrex last price {} unusable: {}", last, e)))
}
