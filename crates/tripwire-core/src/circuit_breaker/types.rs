//! Circuit breaker types and configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::error::{RegistryError, RegistryResult};

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Circuit is closed, operations proceed normally
    Closed,
    /// Circuit is open, operations are rejected
    Open,
    /// Circuit is half-open, limited operations allowed to test recovery
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        };
        f.write_str(label)
    }
}

/// Configuration for circuit breaker behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Number of failures inside the window before opening the circuit
    pub failure_threshold: u32,
    /// Number of successes needed in half-open state to close
    pub success_threshold: u32,
    /// Time to wait before transitioning from open to half-open
    #[serde(with = "humantime_serde")]
    pub reset_timeout: Duration,
    /// Sliding window size for failure counting
    #[serde(with = "humantime_serde")]
    pub window_size: Duration,
    /// Maximum concurrent requests in half-open state
    pub half_open_max_requests: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 3,
            reset_timeout: Duration::from_secs(30),
            window_size: Duration::from_secs(60),
            half_open_max_requests: 3,
        }
    }
}

impl CircuitBreakerConfig {
    /// Create a config for aggressive circuit breaking
    pub fn aggressive() -> Self {
        Self {
            failure_threshold: 3,
            success_threshold: 2,
            reset_timeout: Duration::from_secs(15),
            window_size: Duration::from_secs(30),
            half_open_max_requests: 1,
        }
    }

    /// Reject tuning a breaker could never recover from
    ///
    /// A zero `half_open_max_requests` keeps a half-open breaker refusing
    /// every request; zero thresholds trip or close on no evidence at all.
    pub fn validate(&self) -> RegistryResult<()> {
        for (field, value) in [
            ("failure_threshold", self.failure_threshold),
            ("success_threshold", self.success_threshold),
            ("half_open_max_requests", self.half_open_max_requests),
        ] {
            if value == 0 {
                return Err(RegistryError::config(format!("{field} must be at least 1")));
            }
        }
        Ok(())
    }

    /// Create a config for lenient circuit breaking
    pub fn lenient() -> Self {
        Self {
            failure_threshold: 10,
            success_threshold: 5,
            reset_timeout: Duration::from_secs(60),
            window_size: Duration::from_secs(120),
            half_open_max_requests: 5,
        }
    }
}

/// Error from circuit breaker protected calls
#[derive(Debug, Error)]
pub enum CircuitBreakerError<E> {
    /// Circuit is open
    #[error("Circuit breaker open for component: {component}")]
    Open { component: String },
    /// Operation failed
    #[error("Operation failed: {0}")]
    OperationFailed(E),
}

impl<E> CircuitBreakerError<E> {
    /// Whether the call was rejected without running the operation
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    /// Unwrap the operation's own error, if the operation ran
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Open { .. } => None,
            Self::OperationFailed(e) => Some(e),
        }
    }
}

/// Statistics for a circuit breaker
#[derive(Debug, Clone)]
pub struct CircuitBreakerStats {
    pub state: CircuitState,
    pub failure_count: u32,
    pub success_count: u32,
    pub total_calls: u64,
    pub total_failures: u64,
    pub last_failure: Option<Instant>,
    pub opened_at: Option<Instant>,
}

impl CircuitBreakerStats {
    /// Calculate failure rate as a percentage
    pub fn failure_rate(&self) -> f64 {
        if self.total_calls == 0 {
            0.0
        } else {
            (self.total_failures as f64 / self.total_calls as f64) * 100.0
        }
    }
}

/// Counters describing a registry's lifetime activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistryStats {
    /// Breakers currently registered
    pub breakers: usize,
    /// Breakers constructed and inserted since the registry was created
    pub created: u64,
    /// Creations aborted by an invalid identifier or a refused publish
    pub export_failures: u64,
}
