use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::OrderError;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Line item inside an order. Owned entirely by its parent order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

impl OrderItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64, quantity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            quantity,
        }
    }

    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Fixed order progression: Pending → Confirmed → Preparing → Shipped → Delivered.
///
/// Documents written by the original storefront carry French labels, which
/// are still accepted when reading. Any other label read from a document is
/// kept verbatim as `Other` so the record survives the next write.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(alias = "En attente")]
    Pending,
    #[serde(alias = "Confirmée")]
    Confirmed,
    #[serde(alias = "En préparation")]
    Preparing,
    #[serde(alias = "Expédiée")]
    Shipped,
    #[serde(alias = "Livrée")]
    Delivered,
    /// Label outside the progression
    #[serde(untagged)]
    Other(String),
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Other(label) => label,
        }
    }

    /// Customer-facing French label, as shown by the storefront.
    pub fn label(&self) -> &str {
        match self {
            OrderStatus::Pending => "En attente",
            OrderStatus::Confirmed => "Confirmée",
            OrderStatus::Preparing => "En préparation",
            OrderStatus::Shipped => "Expédiée",
            OrderStatus::Delivered => "Livrée",
            OrderStatus::Other(label) => label,
        }
    }

    /// Position in the progression, starting at 0 for `Pending`.
    pub fn step(&self) -> Option<usize> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Confirmed => Some(1),
            OrderStatus::Preparing => Some(2),
            OrderStatus::Shipped => Some(3),
            OrderStatus::Delivered => Some(4),
            OrderStatus::Other(_) => None,
        }
    }

    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Confirmed),
            OrderStatus::Confirmed => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Shipped),
            OrderStatus::Shipped => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Other(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        *self == OrderStatus::Delivered
    }

    /// True when moving to `to` follows the progression: either the very
    /// next step or a re-apply of the current status.
    pub fn can_transition_to(&self, to: &OrderStatus) -> bool {
        self == to || self.next().as_ref() == Some(to)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Strict parse for operator input: only the five known statuses, by English
/// name or French label.
impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "pending" | "en attente" => Ok(OrderStatus::Pending),
            "confirmed" | "confirmée" => Ok(OrderStatus::Confirmed),
            "preparing" | "en préparation" => Ok(OrderStatus::Preparing),
            "shipped" | "expédiée" => Ok(OrderStatus::Shipped),
            "delivered" | "livrée" => Ok(OrderStatus::Delivered),
            _ => Err(OrderError::UnknownStatus(s.to_string())),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
