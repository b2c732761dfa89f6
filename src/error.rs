//! Error types for the signal relay

use regex::Regex;
use std::fmt;
use thiserror::Error;

/// Semantic field a required extraction step produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalField {
    CoinPair,
    BuyPrice,
    Targets,
    StopLoss,
}

impl fmt::Display for SignalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalField::CoinPair => "coin pair",
            SignalField::BuyPrice => "buy price",
            SignalField::Targets => "targets",
            SignalField::StopLoss => "stop loss",
        };
        f.write_str(name)
    }
}

/// A required pattern step did not match the message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field} pattern failed for {source_id}{}", pattern_suffix(.pattern))]
pub struct ExtractionError {
    pub field: SignalField,
    /// Source id whose format rejected the message
    pub source_id: String,
    /// Regex that did not match, or matched an unusable value
    pub pattern: Option<String>,
}

impl ExtractionError {
    pub fn new(field: SignalField, source_id: impl Into<String>) -> Self {
        Self {
            field,
            source_id: source_id.into(),
            pattern: None,
        }
    }

    pub fn with_pattern(mut self, pattern: &Regex) -> Self {
        self.pattern = Some(pattern.as_str().to_string());
        self
    }
}

fn pattern_suffix(pattern: &Option<String>) -> String {
    match pattern {
        Some(p) => format!(": /{}/", p),
        None => String::new(),
    }
}

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Classification error: {0}")]
    Classification(#[from] ExtractionError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Forward error: {0}")]
    Forward(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// Per-message failures the pipeline absorbs into the plain-report path
    pub fn is_contained(&self) -> bool {
        matches!(
            self,
            RelayError::Classification(_)
                | RelayError::Network(_)
                | RelayError::Remote(_)
                | RelayError::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
