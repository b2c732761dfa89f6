//! Source id → extractor lookup

use super::{sources, SignalExtractor};
use crate::error::Result;
use crate::types::Exchange;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A known signal channel and how to read it
#[derive(Clone)]
pub struct SourceDefinition {
    /// Channel username, matched case-sensitively
    pub id: String,
    pub display_name: String,
    pub exchange: Exchange,
    pub extractor: Arc<dyn SignalExtractor>,
}

impl SourceDefinition {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        exchange: Exchange,
        extractor: impl SignalExtractor + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            exchange,
            extractor: Arc::new(extractor),
        }
    }
}

impl fmt::Debug for SourceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceDefinition")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("exchange", &self.exchange)
            .finish_non_exhaustive()
    }
}

/// Immutable after startup
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: HashMap<String, SourceDefinition>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry of every built-in channel format
    pub fn builtin() -> Result<Self> {
        Ok(sources::builtin()?.into_iter().collect())
    }

    pub fn register(&mut self, source: SourceDefinition) {
        if self.sources.contains_key(&source.id) {
            tracing::warn!("Replacing source definition for {}", source.id);
        }
        self.sources.insert(source.id.clone(), source);
    }

    pub fn get(&self, source_id: &str) -> Option<&SourceDefinition> {
        self.sources.get(source_id)
    }

    /// Registered ids, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.sources.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl FromIterator<SourceDefinition> for SourceRegistry {
    fn from_iter<I: IntoIterator<Item = SourceDefinition>>(iter: I) -> Self {
        let mut registry = SourceRegistry::new();
        for source in iter {
            registry.register(source);
        }
        registry
    }
}
