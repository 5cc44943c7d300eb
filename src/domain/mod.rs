// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Order records, their status progression and checkout construction.
// This layer has no knowledge of storage or mail delivery.
//
// ============================================================================

pub mod order;
