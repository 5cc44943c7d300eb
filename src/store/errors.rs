use crate::domain::order::OrderStatus;

// ============================================================================
// Order Store Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing medium cannot be created or accessed. No order operation
    /// can proceed, so this always reaches the caller.
    #[error("Order storage unavailable at {location}: {source}")]
    StorageUnavailable {
        location: String,
        #[source]
        source: std::io::Error,
    },

    /// The backing medium exists but does not hold a valid order document.
    /// `OrderStore` recovers from this locally.
    #[error("Order storage unreadable: {0}")]
    StorageUnreadable(String),

    #[error("Failed to encode order document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Invalid status transition for order {id}: {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("Order writer unavailable: {0}")]
    WriterUnavailable(String),
}

impl StoreError {
    pub fn unavailable(location: impl Into<String>, source: std::io::Error) -> Self {
        StoreError::StorageUnavailable {
            location: location.into(),
            source,
        }
    }
}
