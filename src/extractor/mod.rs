//! Signal extraction from channel messages
//!
//! Every known channel posts calls in its own free-text layout. Each layout is
//! a [`PatternExtractor`]: an ordered list of pattern steps (coin pair, buy
//! price, targets, stop-loss) with per-format price scaling and a derived
//! stop-loss fallback. The [`SourceRegistry`] maps a channel username to its
//! extractor.

pub mod pattern;
pub mod registry;
mod sources;

#[cfg(test)]
mod tests;

pub use pattern::{
    derive_stop_loss, PatternExtractor, PriceScale, Step, StopLossRule, TargetRule,
    DERIVED_STOP_LOSS_RATIO,
};
pub use registry::{SourceDefinition, SourceRegistry};

use crate::error::ExtractionError;
use crate::types::Signal;

/// Turns one channel's message text into a [`Signal`]
pub trait SignalExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Result<Signal, ExtractionError>;
}
