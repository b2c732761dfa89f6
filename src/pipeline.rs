//! Per-message processing: relevance gate, de-duplication, extraction,
//! price enrichment and reporting.
//!
//! Nothing that goes wrong with a single message escapes [`SignalPipeline::process`];
//! extraction and lookup failures degrade to a plain report so a relevant
//! message is never silently dropped.

use crate::catalog::CurrencyCatalog;
use crate::client::MarketPriceLookup;
use crate::dedup::DuplicateFilter;
use crate::error::{RelayError, Result};
use crate::extractor::{SourceDefinition, SourceRegistry};
use crate::report::{PlainReport, Reporter, StructuredReport};
use crate::types::RawMessage;
use parking_lot::Mutex;

/// Why a message produced no report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    EmptyBody,
    Duplicate,
    /// No known currency symbol in the text
    Irrelevant,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Ignored(IgnoreReason),
    Structured(StructuredReport),
    Plain {
        report: PlainReport,
        /// Contained failure that forced the fallback, if any
        reason: Option<String>,
    },
}

pub struct SignalPipeline {
    registry: SourceRegistry,
    catalog: CurrencyCatalog,
    duplicates: Mutex<DuplicateFilter>,
    prices: MarketPriceLookup,
    reporter: Reporter,
}

impl SignalPipeline {
    pub fn new(
        registry: SourceRegistry,
        catalog: CurrencyCatalog,
        prices: MarketPriceLookup,
        reporter: Reporter,
    ) -> Self {
        Self {
            registry,
            catalog,
            duplicates: Mutex::new(DuplicateFilter::default()),
            prices,
            reporter,
        }
    }

    pub fn with_duplicate_capacity(mut self, capacity: usize) -> Self {
        self.duplicates = Mutex::new(DuplicateFilter::new(capacity));
        self
    }

    /// Run one inbound message to completion
    pub async fn process(&self, message: &RawMessage) -> Outcome {
        if !message.has_body() {
            return Outcome::Ignored(IgnoreReason::EmptyBody);
        }

        if let Some(reason) = self.admit(&message.text) {
            tracing::debug!(
                "Ignoring message from {}: {:?}",
                message.source_display_name,
                reason
            );
            return Outcome::Ignored(reason);
        }

        let source = message
            .source_id
            .as_deref()
            .and_then(|id| self.registry.get(id));

        let Some(source) = source else {
            return self.plain(message, None);
        };

        match self.enrich(source, &message.text).await {
            Ok(report) => {
                tracing::info!(
                    "Signal from {}: {} buy {}",
                    source.id,
                    report.coin_pair(),
                    report.signal.buy_price
                );
                self.reporter.structured(&report);
                Outcome::Structured(report)
            }
            Err(e) => {
                if e.is_contained() {
                    tracing::warn!("Falling back to plain report for {}: {}", source.id, e);
                } else {
                    tracing::error!("Falling back to plain report for {}: {}", source.id, e);
                }
                self.plain(message, Some(e.to_string()))
            }
        }
    }

    /// Extract and report a single message for a named source, skipping the
    /// relevance and duplicate gates. Unknown sources and failures are returned.
    pub async fn test_message(&self, text: &str, source_id: &str) -> Result<StructuredReport> {
        let source = self.registry.get(source_id).ok_or_else(|| {
            RelayError::Config(format!("Channel not configured for username: {}", source_id))
        })?;

        let report = self.enrich(source, text).await?;
        self.reporter.structured(&report);
        Ok(report)
    }

    /// Duplicate check, relevance check, then record. Returns why the message
    /// is rejected, or `None` once it has been recorded.
    fn admit(&self, text: &str) -> Option<IgnoreReason> {
        let mut duplicates = self.duplicates.lock();
        if duplicates.seen(text) {
            return Some(IgnoreReason::Duplicate);
        }
        if self.catalog.contains(text).is_none() {
            return Some(IgnoreReason::Irrelevant);
        }
        duplicates.record(text);
        None
    }

    async fn enrich(&self, source: &SourceDefinition, text: &str) -> Result<StructuredReport> {
        let signal = source.extractor.extract(text)?;
        let price = self
            .prices
            .last_price(source.exchange, &signal.coin_pair)
            .await?;

        Ok(StructuredReport::new(
            source.display_name.clone(),
            source.exchange,
            signal,
            price,
        ))
    }

    fn plain(&self, message: &RawMessage, reason: Option<String>) -> Outcome {
        let report = PlainReport {
            channel_title: message.source_display_name.clone(),
            channel_id: message.source_id.clone(),
            timestamp: message.timestamp,
            text: message.text.clone(),
        };
        self.reporter.plain(&report);
        Outcome::Plain { report, reason }
    }
}
