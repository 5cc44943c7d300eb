use serde::{Deserialize, Serialize};

use super::value_objects::{OrderItem, OrderStatus};

// ============================================================================
// Order Record
// ============================================================================

const TRACKING_PREFIX: &str = "TRK-";

/// Tracking number derived from an order id when none was supplied.
pub fn tracking_number_for(order_id: &str) -> String {
    format!("{}{}", TRACKING_PREFIX, order_id)
}

/// Persisted representation of a single customer purchase.
///
/// `total` is computed by the caller and stored as given; `date` is an
/// ISO 8601 string set once at creation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub items: Vec<OrderItem>,
    pub total: f64,
    pub date: String,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
}

impl Order {
    /// Copy of this order with only the status replaced.
    pub fn with_status(&self, status: OrderStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Stored form of a creation input: `TRK-<id>` is derived when no
    /// tracking number was supplied.
    pub fn with_derived_tracking(mut self) -> Self {
        if self.tracking_number.is_none() {
            self.tracking_number = Some(tracking_number_for(&self.id));
        }
        self
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
