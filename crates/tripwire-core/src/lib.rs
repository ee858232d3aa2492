//! Tripwire Core Library
//!
//! This crate keeps a registry of named circuit breakers. Each name maps to
//! exactly one breaker for the lifetime of the registry, and newly created
//! breakers can optionally be published to an external management plane.

pub mod circuit_breaker;
pub mod config;
pub mod error;
pub mod export;

// Re-export commonly used types
pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitBreakerRegistry,
    CircuitBreakerStats, CircuitState, RegistryStats,
};
pub use config::{BreakerOverride, IdentifierConfig, RegistryConfig};
pub use error::{RegistryError, RegistryResult};
pub use export::{
    BreakerExporter, ExportError, ExternalIdentifier, IdentifierError, InMemoryExporter,
};
