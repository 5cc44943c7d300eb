use std::sync::Arc;
use std::time::Duration;

use crate::domain::order::Order;
use super::message::{MailMessage, Template};
use super::transport::{MailTransport, TransportError};

// ============================================================================
// Notification Dispatcher - best-effort order mail
// ============================================================================
//
// Invoked after an order mutation is already durable. At most one send
// attempt per event and no retry. Failures never reach the caller of the
// mutation.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    /// The order carries no contact address
    NoRecipient,
    /// No transport, or the transport reports it is not configured
    NotConfigured,
    /// The transport failed, was unavailable, or timed out
    Failed,
}

impl DispatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::Sent => "sent",
            DispatchOutcome::NoRecipient => "no_recipient",
            DispatchOutcome::NotConfigured => "not_configured",
            DispatchOutcome::Failed => "failed",
        }
    }
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    transport: Option<Arc<dyn MailTransport>>,
    from: String,
    send_timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(
        transport: Option<Arc<dyn MailTransport>>,
        from: impl Into<String>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            from: from.into(),
            send_timeout,
        }
    }

    /// Dispatcher that never sends anything.
    pub fn disabled(from: impl Into<String>) -> Self {
        Self::new(None, from, Duration::from_secs(10))
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    pub async fn notify_order_created(&self, order: &Order) -> DispatchOutcome {
        self.dispatch(Template::OrderConfirmation, order).await
    }

    pub async fn notify_status_changed(&self, order: &Order) -> DispatchOutcome {
        self.dispatch(Template::StatusUpdate, order).await
    }

    async fn dispatch(&self, template: Template, order: &Order) -> DispatchOutcome {
        let Some(message) = template.render(order, &self.from) else {
            tracing::debug!(order_id = %order.id, template = template.as_str(), "No contact address, skipping notification");
            return DispatchOutcome::NoRecipient;
        };

        let Some(transport) = &self.transport else {
            tracing::debug!(order_id = %order.id, template = template.as_str(), "Mail transport not configured, skipping notification");
            return DispatchOutcome::NotConfigured;
        };

        self.send(transport.as_ref(), template, order, &message).await
    }

    async fn send(
        &self,
        transport: &dyn MailTransport,
        template: Template,
        order: &Order,
        message: &MailMessage,
    ) -> DispatchOutcome {
        match tokio::time::timeout(self.send_timeout, transport.send(message)).await {
            Ok(Ok(())) => {
                tracing::info!(
                    order_id = %order.id,
                    template = template.as_str(),
                    transport = transport.name(),
                    "📧 Notification sent"
                );
                DispatchOutcome::Sent
            }
            Ok(Err(TransportError::NotConfigured)) => {
                tracing::debug!(order_id = %order.id, transport = transport.name(), "Mail transport reports it is not configured");
                DispatchOutcome::NotConfigured
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    order_id = %order.id,
                    template = template.as_str(),
                    transport = transport.name(),
                    error = %e,
                    "Notification failed"
                );
                DispatchOutcome::Failed
            }
            Err(_) => {
                tracing::warn!(
                    order_id = %order.id,
                    template = template.as_str(),
                    timeout = ?self.send_timeout,
                    "Notification timed out"
                );
                DispatchOutcome::Failed
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
