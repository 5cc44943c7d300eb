use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::domain::order::{Order, OrderStatus};
use crate::metrics::Metrics;
use crate::notifications::{NotificationDispatcher, Template};
use crate::store::{OrderStore, StoreError};

// ============================================================================
// Order Service
// ============================================================================
//
// Orchestrates: mutation → OrderStore (durable) → NotificationDispatcher
//
// The four operations here are the whole contract offered to presentation
// code and tooling. Once a mutation is durable its notification runs on a
// detached task, so callers never wait for mail delivery. Outcomes are
// recorded in metrics, never returned as errors.
//
// ============================================================================

pub struct OrderService {
    store: OrderStore,
    dispatcher: NotificationDispatcher,
    metrics: Option<Arc<Metrics>>,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl OrderService {
    pub fn new(store: OrderStore, dispatcher: NotificationDispatcher) -> Self {
        Self {
            store,
            dispatcher,
            metrics: None,
            in_flight: Mutex::new(Vec::new()),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    async fn spawn_notification(&self, template: Template, order: Order) {
        let dispatcher = self.dispatcher.clone();
        let metrics = self.metrics.clone();

        let handle = tokio::spawn(async move {
            let outcome = match template {
                Template::OrderConfirmation => dispatcher.notify_order_created(&order).await,
                Template::StatusUpdate => dispatcher.notify_status_changed(&order).await,
            };
            if let Some(metrics) = metrics {
                metrics.record_notification(template.as_str(), outcome.as_str());
            }
        });

        let mut in_flight = self.in_flight.lock().await;
        in_flight.retain(|task| !task.is_finished());
        in_flight.push(handle);
    }

    /// Wait for every notification spawned so far.
    pub async fn drain_notifications(&self) {
        let pending = std::mem::take(&mut *self.in_flight.lock().await);
        if !pending.is_empty() {
            tracing::debug!(count = pending.len(), "Waiting for pending notifications");
        }
        for task in pending {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Notification task failed");
            }
        }
    }

    pub async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        self.store.list_all().await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Order>, StoreError> {
        self.store.get_by_id(id).await
    }

    /// Persist the order, then send the confirmation mail in the background.
    pub async fn create(&self, new_order: Order) -> Result<Order, StoreError> {
        let order = self.store.create(new_order).await?;
        if let Some(metrics) = &self.metrics {
            metrics.record_order_created();
        }

        self.spawn_notification(Template::OrderConfirmation, order.clone()).await;

        Ok(order)
    }

    /// Persist the new status, then send the status update mail in the
    /// background. Unknown ids send nothing.
    pub async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        let Some(order) = self.store.update_status(id, status).await? else {
            if let Some(metrics) = &self.metrics {
                metrics.record_status_update_miss();
            }
            return Ok(None);
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_status_update(order.status.as_str());
        }

        self.spawn_notification(Template::StatusUpdate, order.clone()).await;

        Ok(Some(order))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
