// ============================================================================
// Actors Module
// ============================================================================
//
// The order writer actor serializes every store access of the process.
//
// ============================================================================

pub mod order_writer;

pub use order_writer::{OrderWriter, OrderWriterHandle};
