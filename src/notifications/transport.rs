use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use uuid::Uuid;

use crate::utils::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitState};
use super::message::MailMessage;

// ============================================================================
// Mail Transport - outbound delivery port
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Mail transport is not configured")]
    NotConfigured,

    #[error("Mail transport unavailable: {0}")]
    Unavailable(String),

    #[error("Message rejected: {0}")]
    Rejected(String),

    #[error("Mail transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, message: &MailMessage) -> Result<(), TransportError>;
}

// ============================================================================
// Spool Transport - pickup directory, one JSON file per message
// ============================================================================

pub struct SpoolTransport {
    dir: PathBuf,
}

impl SpoolTransport {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl MailTransport for SpoolTransport {
    fn name(&self) -> &str {
        "spool"
    }

    async fn send(&self, message: &MailMessage) -> Result<(), TransportError> {
        if message.to.trim().is_empty() {
            return Err(TransportError::Rejected("empty recipient".to_string()));
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let file_name = format!("{}-{}.json", Utc::now().timestamp_millis(), Uuid::new_v4());
        let path = self.dir.join(file_name);
        let payload = serde_json::to_vec_pretty(message)
            .map_err(|e| TransportError::Rejected(e.to_string()))?;

        tokio::fs::write(&path, payload).await?;

        tracing::debug!(
            path = %path.display(),
            to = %message.to,
            subject = %message.subject,
            "Spooled mail message"
        );

        Ok(())
    }
}

// ============================================================================
// Breaker Transport - stops calling a transport that keeps failing
// ============================================================================

pub struct BreakerTransport<T> {
    inner: T,
    circuit_breaker: CircuitBreaker,
}

impl<T: MailTransport> BreakerTransport<T> {
    pub fn new(inner: T, config: CircuitBreakerConfig) -> Self {
        Self {
            inner,
            circuit_breaker: CircuitBreaker::new(config),
        }
    }

    pub async fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.get_state().await
    }
}

#[async_trait]
impl<T: MailTransport> MailTransport for BreakerTransport<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn send(&self, message: &MailMessage) -> Result<(), TransportError> {
        match self.circuit_breaker.call(self.inner.send(message)).await {
            Ok(()) => Ok(()),
            Err(CircuitBreakerError::CircuitOpen) => {
                tracing::warn!(transport = %self.inner.name(), "Circuit breaker open - mail transport unavailable");
                Err(TransportError::Unavailable("circuit breaker open".to_string()))
            }
            Err(CircuitBreakerError::OperationFailed(e)) => Err(e),
        }
    }
}
