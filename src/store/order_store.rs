use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use crate::domain::order::{Order, OrderStatus};
use crate::metrics::Metrics;
use super::errors::StoreError;
use super::storage::OrderStorage;

// ============================================================================
// Order Store - durable create / read / status transition
// ============================================================================
//
// Every mutation is a read-modify-write of the entire collection. Two
// writers sharing one medium can lose an update (last writer wins). Inside
// the application all mutations go through the OrderWriter actor.
//
// ============================================================================

/// What `update_status` does with a transition that skips or reverses the
/// Pending → Confirmed → Preparing → Shipped → Delivered progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Accept any status, logging out-of-order moves.
    #[default]
    Permissive,
    /// Only allow re-applying the current status or moving one step forward.
    Strict,
}

impl FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "permissive" => Ok(TransitionPolicy::Permissive),
            "strict" => Ok(TransitionPolicy::Strict),
            other => Err(format!("unknown transition policy: {}", other)),
        }
    }
}

pub struct OrderStore {
    storage: Arc<dyn OrderStorage>,
    policy: TransitionPolicy,
    metrics: Option<Arc<Metrics>>,
}

impl OrderStore {
    pub fn new(storage: Arc<dyn OrderStorage>) -> Self {
        Self {
            storage,
            policy: TransitionPolicy::default(),
            metrics: None,
        }
    }

    pub fn with_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    pub fn location(&self) -> String {
        self.storage.location()
    }

    /// Time `operation`, recording the duration whatever its outcome.
    async fn observed<T, F>(&self, operation: &str, fut: F) -> Result<T, StoreError>
    where
        F: std::future::Future<Output = Result<T, StoreError>>,
    {
        let started = Instant::now();
        let result = fut.await;
        if let Some(metrics) = &self.metrics {
            metrics.observe_store_operation(operation, started.elapsed());
        }
        result
    }

    /// Guarantee the medium exists and holds a collection. Idempotent; the
    /// only failure is an unreachable medium.
    pub async fn ensure_storage(&self) -> Result<(), StoreError> {
        self.storage.ensure().await
    }

    async fn load(&self) -> Result<Vec<Order>, StoreError> {
        self.ensure_storage().await?;

        match self.storage.load().await {
            Ok(orders) => Ok(orders),
            // Corrupt content reads as an empty collection. The next write
            // replaces the corrupt document, so its orders are lost.
            Err(StoreError::StorageUnreadable(reason)) => {
                tracing::warn!(
                    location = %self.storage.location(),
                    reason = %reason,
                    "Order document unreadable, treating as empty"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_storage_unreadable();
                }
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Every persisted order in creation order.
    pub async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        self.observed("list_all", self.load()).await
    }

    /// First order with a matching id.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Order>, StoreError> {
        self.observed("get_by_id", async {
            Ok(self.load().await?.into_iter().find(|order| order.id == id))
        })
        .await
    }

    /// Append an order, deriving its tracking number when missing. Not
    /// idempotent: the same id twice yields two records.
    pub async fn create(&self, new_order: Order) -> Result<Order, StoreError> {
        self.observed("create", self.append(new_order)).await
    }

    /// Replace the status of an order. `None` when no order has this id; the
    /// collection is then left untouched.
    pub async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        self.observed("update_status", self.replace_status(id, status)).await
    }

    async fn append(&self, new_order: Order) -> Result<Order, StoreError> {
        let mut orders = self.load().await?;

        if orders.iter().any(|existing| existing.id == new_order.id) {
            tracing::warn!(order_id = %new_order.id, "Appending order with duplicate id");
        }

        let order = new_order.with_derived_tracking();
        orders.push(order.clone());
        self.storage.save(&orders).await?;

        tracing::info!(
            order_id = %order.id,
            status = %order.status,
            item_count = order.items.len(),
            total = order.total,
            "✅ Order created"
        );

        Ok(order)
    }

    async fn replace_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        let mut orders = self.load().await?;

        let Some(index) = orders.iter().position(|order| order.id == id) else {
            tracing::debug!(order_id = %id, status = %status, "Status update for unknown order");
            return Ok(None);
        };

        let from = orders[index].status.clone();
        if !from.can_transition_to(&status) {
            match self.policy {
                TransitionPolicy::Strict => {
                    tracing::warn!(order_id = %id, from = %from, to = %status, "Rejected status transition");
                    return Err(StoreError::InvalidTransition {
                        id: id.to_string(),
                        from,
                        to: status,
                    });
                }
                TransitionPolicy::Permissive => {
                    tracing::warn!(order_id = %id, from = %from, to = %status, "Out-of-order status transition");
                }
            }
        }

        tracing::info!(order_id = %id, from = %from, to = %status, "Order status updated");

        let updated = orders[index].with_status(status);
        orders[index] = updated.clone();
        self.storage.save(&orders).await?;

        Ok(Some(updated))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
