use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

// ============================================================================
// Circuit Breaker
// ============================================================================
//
// Tracks consecutive failures of a collaborator and stops calling it for a
// cool-down period once a threshold is reached.
//
// States:
// - Closed: calls pass through
// - Open: calls fail immediately until the cool-down elapses
// - HalfOpen: probing calls allowed; enough successes close the circuit,
//   any failure reopens it
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens
    pub failure_threshold: u32,
    /// Cool-down before a half-open probe is allowed
    pub timeout: Duration,
    /// Successful probes needed to close from half-open
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            timeout: Duration::from_secs(30),
            success_threshold: 1,
        }
    }
}

#[derive(Debug)]
struct Counters {
    state: CircuitState,
    failures: u32,
    probes_succeeded: u32,
    opened_at: Option<Instant>,
}

impl Counters {
    fn closed() -> Self {
        Self {
            state: CircuitState::Closed,
            failures: 0,
            probes_succeeded: 0,
            opened_at: None,
        }
    }

    fn admit(&mut self, config: &CircuitBreakerConfig) -> bool {
        if self.state != CircuitState::Open {
            return true;
        }
        match self.opened_at {
            Some(opened_at) if opened_at.elapsed() >= config.timeout => {
                tracing::info!("Circuit breaker half-open, probing");
                self.state = CircuitState::HalfOpen;
                self.probes_succeeded = 0;
                true
            }
            _ => false,
        }
    }

    fn on_success(&mut self, config: &CircuitBreakerConfig) {
        match self.state {
            CircuitState::HalfOpen => {
                self.probes_succeeded += 1;
                if self.probes_succeeded >= config.success_threshold {
                    tracing::info!(probes = self.probes_succeeded, "Circuit breaker closed");
                    *self = Counters::closed();
                }
            }
            CircuitState::Closed => self.failures = 0,
            CircuitState::Open => {}
        }
    }

    fn on_failure(&mut self, config: &CircuitBreakerConfig) {
        self.failures += 1;
        match self.state {
            CircuitState::Closed if self.failures >= config.failure_threshold => {
                tracing::warn!(failures = self.failures, "Circuit breaker opened");
                self.state = CircuitState::Open;
                self.opened_at = Some(Instant::now());
            }
            CircuitState::HalfOpen => {
                tracing::warn!("Probe failed, circuit breaker reopened");
                self.state = CircuitState::Open;
                self.opened_at = Some(Instant::now());
                self.probes_succeeded = 0;
            }
            _ => {}
        }
    }
}

#[derive(Clone)]
pub struct CircuitBreaker {
    counters: Arc<Mutex<Counters>>,
    config: CircuitBreakerConfig,
}

#[derive(Debug)]
pub enum CircuitBreakerError<E> {
    CircuitOpen,
    OperationFailed(E),
}

impl<E: std::fmt::Display> std::fmt::Display for CircuitBreakerError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitBreakerError::CircuitOpen => write!(f, "Circuit breaker is open"),
            CircuitBreakerError::OperationFailed(e) => write!(f, "Operation failed: {}", e),
        }
    }
}

impl<E: std::error::Error> std::error::Error for CircuitBreakerError<E> {}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            counters: Arc::new(Mutex::new(Counters::closed())),
            config,
        }
    }

    /// Run `operation` unless the circuit is open.
    pub async fn call<F, T, E>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: std::future::Future<Output = Result<T, E>>,
    {
        if !self.counters.lock().await.admit(&self.config) {
            return Err(CircuitBreakerError::CircuitOpen);
        }

        let result = operation.await;

        let mut counters = self.counters.lock().await;
        match result {
            Ok(value) => {
                counters.on_success(&self.config);
                Ok(value)
            }
            Err(err) => {
                counters.on_failure(&self.config);
                Err(CircuitBreakerError::OperationFailed(err))
            }
        }
    }

    pub async fn get_state(&self) -> CircuitState {
        self.counters.lock().await.state
    }

    pub async fn reset(&self) {
        tracing::info!("Circuit breaker manually reset");
        *self.counters.lock().await = Counters::closed();
    }
}
