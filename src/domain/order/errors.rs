// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum OrderError {
    #[error("Order items cannot be empty")]
    EmptyItems,

    #[error("Invalid quantity for item {item_id}: {quantity}")]
    InvalidQuantity { item_id: String, quantity: u32 },

    #[error("Invalid price for item {item_id}: {price}")]
    InvalidPrice { item_id: String, price: f64 },

    #[error("Invalid tax rate: {0}")]
    InvalidTaxRate(f64),

    #[error("Unknown order status: {0}")]
    UnknownStatus(String),
}
