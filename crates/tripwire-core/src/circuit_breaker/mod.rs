//! Circuit breaker pattern for fault tolerance
//!
//! Prevents cascading failures by temporarily disabling failing operations.
//! Breakers are created and shared through [`CircuitBreakerRegistry`].

mod breaker;
mod registry;
mod tests;
mod types;

// Re-export all public items
pub use breaker::CircuitBreaker;
pub use registry::CircuitBreakerRegistry;
pub use types::{
    CircuitBreakerConfig, CircuitBreakerError, CircuitBreakerStats, CircuitState, RegistryStats,
};
