//! Circuit breaker implementation

use parking_lot::{Mutex, RwLock};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use super::types::{CircuitBreakerConfig, CircuitBreakerError, CircuitBreakerStats, CircuitState};

/// Mutable state machine data, always updated under one lock
#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    /// Failures counted in the current window
    failure_count: u32,
    /// Successes counted while half-open
    success_count: u32,
    /// Requests admitted while half-open
    half_open_requests: u32,
    window_started: Option<Instant>,
    opened_at: Option<Instant>,
    last_failure: Option<Instant>,
}

impl BreakerState {
    fn closed() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            success_count: 0,
            half_open_requests: 0,
            window_started: None,
            opened_at: None,
            last_failure: None,
        }
    }
}

/// Circuit breaker for protecting against failing dependencies
///
/// Every method takes `&self`, so a breaker is normally shared as
/// `Arc<CircuitBreaker>` between the registry, the exporter and callers.
#[derive(Debug)]
pub struct CircuitBreaker {
    /// Component name (for logging and export)
    name: String,
    /// Tuning, replaceable through [`CircuitBreaker::configure`]
    config: RwLock<CircuitBreakerConfig>,
    inner: Mutex<BreakerState>,
    total_calls: AtomicU64,
    total_failures: AtomicU64,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with default config
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, CircuitBreakerConfig::default())
    }

    /// Create a new circuit breaker with custom config
    pub fn with_config(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config: RwLock::new(config),
            inner: Mutex::new(BreakerState::closed()),
            total_calls: AtomicU64::new(0),
            total_failures: AtomicU64::new(0),
        }
    }

    /// Get the component name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the breaker's tuning; the current state is kept
    pub fn configure(&self, config: CircuitBreakerConfig) {
        tracing::debug!(circuit = %self.name, ?config, "Circuit breaker configured");
        *self.config.write() = config;
    }

    /// Get a copy of the active configuration
    pub fn config(&self) -> CircuitBreakerConfig {
        self.config.read().clone()
    }

    /// Get the current state
    pub fn state(&self) -> CircuitState {
        let config = self.config.read();
        let mut inner = self.inner.lock();
        self.refresh(&mut inner, &config);
        inner.state
    }

    /// Check if the circuit allows operations
    pub fn is_allowed(&self) -> bool {
        let config = self.config.read();
        let mut inner = self.inner.lock();
        self.refresh(&mut inner, &config);
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => false,
            CircuitState::HalfOpen => inner.half_open_requests < config.half_open_max_requests,
        }
    }

    /// Acquire permission to make a request (for half-open state tracking)
    pub fn acquire(&self) -> bool {
        let config = self.config.read();
        let mut inner = self.inner.lock();
        self.refresh(&mut inner, &config);
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => false,
            CircuitState::HalfOpen => {
                if inner.half_open_requests >= config.half_open_max_requests {
                    return false;
                }
                inner.half_open_requests += 1;
                true
            }
        }
    }

    /// Record a successful operation
    pub fn record_success(&self) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);

        let config = self.config.read();
        let mut inner = self.inner.lock();
        self.refresh(&mut inner, &config);
        if inner.state == CircuitState::HalfOpen {
            inner.half_open_requests = inner.half_open_requests.saturating_sub(1);
            inner.success_count += 1;
            if inner.success_count >= config.success_threshold {
                self.transition_to_closed(&mut inner);
            }
        }
    }

    /// Record a failed operation
    pub fn record_failure(&self) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        self.total_failures.fetch_add(1, Ordering::Relaxed);

        let config = self.config.read();
        let mut inner = self.inner.lock();
        let now = Instant::now();
        inner.last_failure = Some(now);
        self.refresh(&mut inner, &config);

        match inner.state {
            CircuitState::Closed => {
                let window_expired = inner
                    .window_started
                    .is_none_or(|started| now.duration_since(started) >= config.window_size);
                if window_expired {
                    inner.window_started = Some(now);
                    inner.failure_count = 0;
                }
                inner.failure_count += 1;
                if inner.failure_count >= config.failure_threshold {
                    self.transition_to_open(&mut inner);
                }
            }
            CircuitState::HalfOpen => {
                // Any failure in half-open state opens the circuit again
                inner.half_open_requests = inner.half_open_requests.saturating_sub(1);
                self.transition_to_open(&mut inner);
            }
            CircuitState::Open => {}
        }
    }

    /// Execute an operation with circuit breaker protection
    pub fn call<T, E, F>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if !self.acquire() {
            return Err(CircuitBreakerError::Open {
                component: self.name.clone(),
            });
        }

        match operation() {
            Ok(result) => {
                self.record_success();
                Ok(result)
            }
            Err(e) => {
                self.record_failure();
                Err(CircuitBreakerError::OperationFailed(e))
            }
        }
    }

    /// Execute an async operation with circuit breaker protection
    ///
    /// No lock is held while the future runs.
    pub async fn call_async<T, E, F, Fut>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.acquire() {
            return Err(CircuitBreakerError::Open {
                component: self.name.clone(),
            });
        }

        match operation().await {
            Ok(result) => {
                self.record_success();
                Ok(result)
            }
            Err(e) => {
                self.record_failure();
                Err(CircuitBreakerError::OperationFailed(e))
            }
        }
    }

    /// Get circuit breaker statistics
    pub fn stats(&self) -> CircuitBreakerStats {
        let config = self.config.read();
        let mut inner = self.inner.lock();
        self.refresh(&mut inner, &config);
        CircuitBreakerStats {
            state: inner.state,
            failure_count: inner.failure_count,
            success_count: inner.success_count,
            total_calls: self.total_calls.load(Ordering::Relaxed),
            total_failures: self.total_failures.load(Ordering::Relaxed),
            last_failure: inner.last_failure,
            opened_at: inner.opened_at,
        }
    }

    /// Manually reset the circuit breaker to closed state
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        self.transition_to_closed(&mut inner);
    }

    /// Manually open the circuit breaker
    pub fn trip(&self) {
        let mut inner = self.inner.lock();
        self.transition_to_open(&mut inner);
    }

    /// Move an open circuit to half-open once the reset timeout has elapsed
    fn refresh(&self, inner: &mut BreakerState, config: &CircuitBreakerConfig) {
        if inner.state != CircuitState::Open {
            return;
        }
        if let Some(opened_at) = inner.opened_at {
            if opened_at.elapsed() >= config.reset_timeout {
                self.transition_to_half_open(inner);
            }
        }
    }

    fn transition_to_open(&self, inner: &mut BreakerState) {
        inner.state = CircuitState::Open;
        inner.opened_at = Some(Instant::now());
        inner.success_count = 0;
        inner.half_open_requests = 0;

        tracing::warn!(
            circuit = %self.name,
            "Circuit breaker opened after {} failures",
            inner.failure_count
        );
    }

    fn transition_to_half_open(&self, inner: &mut BreakerState) {
        inner.state = CircuitState::HalfOpen;
        inner.success_count = 0;
        inner.half_open_requests = 0;

        tracing::info!(
            circuit = %self.name,
            "Circuit breaker transitioning to half-open"
        );
    }

    fn transition_to_closed(&self, inner: &mut BreakerState) {
        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        inner.success_count = 0;
        inner.half_open_requests = 0;
        inner.window_started = None;
        inner.opened_at = None;

        tracing::info!(circuit = %self.name, "Circuit breaker closed");
    }
}
