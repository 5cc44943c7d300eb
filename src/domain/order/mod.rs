// ============================================================================
// Order Domain - Business Logic for Order Records
// ============================================================================
//
// This module contains ALL Order-specific code:
// - Value objects (OrderItem, OrderStatus)
// - Record (Order, tracking number derivation)
// - Checkout (CartLine → Order, id generation, totals)
// - Errors (OrderError enum)
//
// Persistence lives in `crate::store`, notifications in `crate::notifications`.
//
// ============================================================================

pub mod value_objects;
pub mod record;
pub mod checkout;
pub mod errors;

// Re-export for convenience
pub use value_objects::*;
pub use record::*;
pub use checkout::*;
pub use errors::*;
