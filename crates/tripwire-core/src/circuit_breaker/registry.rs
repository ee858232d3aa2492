//! Circuit breaker registry for managing named circuit breakers

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::breaker::CircuitBreaker;
use super::types::{CircuitBreakerConfig, CircuitBreakerStats, RegistryStats};
use crate::config::RegistryConfig;
use crate::error::{RegistryError, RegistryResult};
use crate::export::{BreakerExporter, ExternalIdentifier};

/// Collection of circuit breakers keyed by name
///
/// A name maps to at most one breaker for the registry's lifetime. The
/// lookup, construction, configuration, export and insertion of a new
/// breaker all run while the map entry for its name is locked, so callers
/// racing on the same name converge on a single instance. A creation that
/// fails to export leaves the map untouched.
///
/// Breakers are never removed.
pub struct CircuitBreakerRegistry {
    breakers: DashMap<String, Arc<CircuitBreaker>>,
    exporter: RwLock<Option<Arc<dyn BreakerExporter>>>,
    config: RegistryConfig,
    created: AtomicU64,
    export_failures: AtomicU64,
}

impl CircuitBreakerRegistry {
    /// Create a new registry with default config
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a registry with custom config
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            breakers: DashMap::new(),
            exporter: RwLock::new(None),
            config,
            created: AtomicU64::new(0),
            export_failures: AtomicU64::new(0),
        }
    }

    /// Create a registry after checking the config with
    /// [`RegistryConfig::validate`]
    ///
    /// `with_config` accepts any config; a bad identifier namespace or kind
    /// then only shows up once an exporter is bound.
    pub fn try_with_config(config: RegistryConfig) -> RegistryResult<Self> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Bind the exporter used by future creations
    ///
    /// Breakers that already exist are not published retroactively.
    pub fn set_exporter(&self, exporter: Arc<dyn BreakerExporter>) {
        *self.exporter.write() = Some(exporter);
        tracing::debug!("Circuit breaker exporter bound");
    }

    /// Unbind the exporter, returning the previous one
    pub fn clear_exporter(&self) -> Option<Arc<dyn BreakerExporter>> {
        let previous = self.exporter.write().take();
        if previous.is_some() {
            tracing::debug!("Circuit breaker exporter cleared");
        }
        previous
    }

    pub fn has_exporter(&self) -> bool {
        self.exporter.read().is_some()
    }

    /// Get or create a circuit breaker using the registry's default config
    pub fn get(&self, name: &str) -> RegistryResult<Arc<CircuitBreaker>> {
        self.get_or_create(name, self.config.defaults.clone())
    }

    /// Get the breaker registered under `name`, creating it if absent
    ///
    /// An existing breaker is returned unchanged and `config` is ignored.
    /// Otherwise a breaker is built, tuned with `config` plus any override
    /// configured for `name`, published through the bound exporter (if any)
    /// and inserted. Export failures discard the new breaker.
    pub fn get_or_create(
        &self,
        name: &str,
        config: CircuitBreakerConfig,
    ) -> RegistryResult<Arc<CircuitBreaker>> {
        if name.is_empty() {
            return Err(RegistryError::invalid_name("name must not be empty"));
        }

        match self.breakers.entry(name.to_string()) {
            Entry::Occupied(entry) => {
                tracing::debug!(circuit = %name, "Circuit breaker already registered");
                Ok(entry.get().clone())
            }
            Entry::Vacant(entry) => {
                let breaker = Arc::new(CircuitBreaker::new(name));
                breaker.configure(self.config.resolve(name, config));

                if let Err(e) = self.export(name, &breaker) {
                    self.export_failures.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(circuit = %name, error = %e, "Circuit breaker creation aborted");
                    return Err(e);
                }

                entry.insert(breaker.clone());
                self.created.fetch_add(1, Ordering::Relaxed);
                tracing::info!(circuit = %name, "Circuit breaker registered");
                Ok(breaker)
            }
        }
    }

    /// Find an existing circuit breaker; never creates one
    pub fn find(&self, name: &str) -> Option<Arc<CircuitBreaker>> {
        self.breakers.get(name).map(|entry| entry.value().clone())
    }

    /// Publish through the bound exporter, if one is set
    fn export(&self, name: &str, breaker: &Arc<CircuitBreaker>) -> RegistryResult<()> {
        let Some(exporter) = self.exporter.read().clone() else {
            return Ok(());
        };

        let identifier = ExternalIdentifier::new(
            &self.config.identifier.namespace,
            &self.config.identifier.kind,
            name,
        )
        .map_err(|e| RegistryError::invalid_identifier(name, e))?;

        exporter
            .publish(breaker.clone(), &identifier)
            .map_err(|e| RegistryError::publish_failure(&identifier, e))?;

        tracing::info!(circuit = %name, identifier = %identifier, "Circuit breaker published");
        Ok(())
    }

    /// Get all circuit breaker names
    pub fn names(&self) -> Vec<String> {
        self.breakers.iter().map(|e| e.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }

    /// Get stats for all circuit breakers
    pub fn all_stats(&self) -> Vec<(String, CircuitBreakerStats)> {
        self.breakers
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().stats()))
            .collect()
    }

    /// Reset all circuit breakers
    pub fn reset_all(&self) {
        for entry in self.breakers.iter() {
            entry.value().reset();
        }
    }

    /// Get registry counters
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            breakers: self.breakers.len(),
            created: self.created.load(Ordering::Relaxed),
            export_failures: self.export_failures.load(Ordering::Relaxed),
        }
    }
}

impl Default for CircuitBreakerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CircuitBreakerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreakerRegistry")
            .field("breakers", &self.breakers.len())
            .field("has_exporter", &self.has_exporter())
            .field("config", &self.config)
            .finish()
    }
}
