//! Registry configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::circuit_breaker::CircuitBreakerConfig;
use crate::error::{RegistryError, RegistryResult};
use crate::export::ExternalIdentifier;

/// Default namespace of exported identifiers
pub const DEFAULT_NAMESPACE: &str = "tripwire";

/// Default `type=` label of exported identifiers
pub const DEFAULT_KIND: &str = "CircuitBreaker";

/// How exported identifiers are qualified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentifierConfig {
    pub namespace: String,
    pub kind: String,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            kind: DEFAULT_KIND.to_string(),
        }
    }
}

/// Per-name tuning layered over the config supplied at creation
///
/// Unset fields leave the supplied value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerOverride {
    pub failure_threshold: Option<u32>,
    pub success_threshold: Option<u32>,
    #[serde(with = "humantime_serde")]
    pub reset_timeout: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub window_size: Option<Duration>,
    pub half_open_max_requests: Option<u32>,
}

impl BreakerOverride {
    /// Return `base` with every set field replaced
    pub fn apply_to(&self, base: &CircuitBreakerConfig) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.failure_threshold.unwrap_or(base.failure_threshold),
            success_threshold: self.success_threshold.unwrap_or(base.success_threshold),
            reset_timeout: self.reset_timeout.unwrap_or(base.reset_timeout),
            window_size: self.window_size.unwrap_or(base.window_size),
            half_open_max_requests: self
                .half_open_max_requests
                .unwrap_or(base.half_open_max_requests),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Configuration for a [`CircuitBreakerRegistry`](crate::CircuitBreakerRegistry)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Qualification of exported identifiers
    pub identifier: IdentifierConfig,
    /// Breaker config used by `CircuitBreakerRegistry::get`
    pub defaults: CircuitBreakerConfig,
    /// Per-name overrides, applied when a breaker with that name is created
    pub overrides: HashMap<String, BreakerOverride>,
}

impl RegistryConfig {
    /// Parse a registry config from TOML text
    pub fn from_toml_str(content: &str) -> RegistryResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            RegistryError::config_with_context(
                format!("Failed to parse TOML config: {}", e),
                "Deserializing inline TOML configuration",
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every breaker this config can produce is exportable and
    /// has usable tuning
    pub fn validate(&self) -> RegistryResult<()> {
        let IdentifierConfig { namespace, kind } = &self.identifier;
        ExternalIdentifier::check_qualifier(namespace, kind).map_err(|e| {
            RegistryError::config_with_context(
                format!("Invalid identifier settings: {}", e),
                format!("Validating [identifier] namespace '{namespace}' and kind '{kind}'"),
            )
        })?;

        self.defaults
            .validate()
            .map_err(|e| with_context(e, "Validating [defaults]".to_string()))?;

        for (name, tuning) in &self.overrides {
            tuning
                .apply_to(&self.defaults)
                .validate()
                .map_err(|e| with_context(e, format!("Validating [overrides.{name}]")))?;
        }
        Ok(())
    }

    /// Set the identifier namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.identifier.namespace = namespace.into();
        self
    }

    /// Set the identifier kind label
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.identifier.kind = kind.into();
        self
    }

    /// Set the default breaker config
    pub fn with_defaults(mut self, defaults: CircuitBreakerConfig) -> Self {
        self.defaults = defaults;
        self
    }

    /// Add an override for one breaker name
    pub fn with_override(mut self, name: impl Into<String>, tuning: BreakerOverride) -> Self {
        self.overrides.insert(name.into(), tuning);
        self
    }

    /// Final config for a breaker named `name` created with `supplied`
    pub fn resolve(&self, name: &str, supplied: CircuitBreakerConfig) -> CircuitBreakerConfig {
        match self.overrides.get(name) {
            Some(tuning) => tuning.apply_to(&supplied),
            None => supplied,
        }
    }
}

fn with_context(error: RegistryError, context: String) -> RegistryError {
    match error {
        RegistryError::Config { message, .. } => {
            RegistryError::config_with_context(message, context)
        }
        other => other,
    }
}
