//! In-process management plane

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::exporter::{BreakerExporter, ExportError};
use super::identifier::ExternalIdentifier;
use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerStats};

/// Exporter that keeps published breakers in memory, keyed by identifier
///
/// Uses parking_lot::RwLock for synchronous, non-blocking access.
#[derive(Debug, Default)]
pub struct InMemoryExporter {
    published: RwLock<BTreeMap<String, Arc<CircuitBreaker>>>,
}

impl InMemoryExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shared (Arc-wrapped) exporter
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Find a published breaker by its rendered identifier
    pub fn lookup(&self, identifier: &str) -> Option<Arc<CircuitBreaker>> {
        self.published.read().get(identifier).cloned()
    }

    /// All published identifiers, sorted
    pub fn identifiers(&self) -> Vec<String> {
        self.published.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.published.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.published.read().is_empty()
    }

    /// Current statistics of every published breaker
    pub fn snapshot(&self) -> Vec<(String, CircuitBreakerStats)> {
        self.published
            .read()
            .iter()
            .map(|(identifier, breaker)| (identifier.clone(), breaker.stats()))
            .collect()
    }
}

impl BreakerExporter for InMemoryExporter {
    fn publish(
        &self,
        breaker: Arc<CircuitBreaker>,
        identifier: &ExternalIdentifier,
    ) -> Result<(), ExportError> {
        let mut published = self.published.write();
        if published.contains_key(identifier.as_str()) {
            return Err(ExportError::AlreadyPublished {
                identifier: identifier.to_string(),
            });
        }
        published.insert(identifier.to_string(), breaker);
        Ok(())
    }
}
