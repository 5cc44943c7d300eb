// ============================================================================
// Order Store - Persistence Layer
// ============================================================================
//
// OrderStore owns the durable order collection. The medium behind it is an
// OrderStorage adapter: a JSON file in production, memory in tests.
//
// ============================================================================

pub mod errors;
pub mod storage;
pub mod json_file;
pub mod in_memory;
pub mod order_store;

pub use errors::StoreError;
pub use storage::{decode_document, encode_document, OrderStorage};
pub use json_file::JsonFileStorage;
pub use in_memory::InMemoryStorage;
pub use order_store::{OrderStore, TransitionPolicy};
