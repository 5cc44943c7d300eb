use async_trait::async_trait;

use crate::domain::order::Order;
use super::errors::StoreError;

// ============================================================================
// Storage Port - where the order document lives
// ============================================================================
//
// The whole order collection is one document: a JSON array of order records
// in creation order. Adapters only move that document in and out of their
// medium; all order logic stays in OrderStore.
//
// ============================================================================

#[async_trait]
pub trait OrderStorage: Send + Sync {
    /// Human readable location used in logs and errors.
    fn location(&self) -> String;

    /// Make sure the medium exists and holds at least an empty collection.
    /// Idempotent.
    async fn ensure(&self) -> Result<(), StoreError>;

    /// Load the full collection. Corrupt content yields `StorageUnreadable`.
    async fn load(&self) -> Result<Vec<Order>, StoreError>;

    /// Replace the full collection.
    async fn save(&self, orders: &[Order]) -> Result<(), StoreError>;
}

/// Empty collection as first written to a fresh medium.
pub const EMPTY_DOCUMENT: &[u8] = b"[]";

pub fn decode_document(bytes: &[u8]) -> Result<Vec<Order>, StoreError> {
    serde_json::from_slice::<Vec<Order>>(bytes)
        .map_err(|e| StoreError::StorageUnreadable(e.to_string()))
}

pub fn encode_document(orders: &[Order]) -> Result<Vec<u8>, StoreError> {
    Ok(serde_json::to_vec_pretty(orders)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{OrderItem, OrderStatus};

    fn order(id: &str) -> Order {
        Order {
            id: id.to_string(),
            email: None,
            items: vec![OrderItem::new("1", "Widget", 10.0, 2)],
            total: 24.0,
            date: "2025-01-01T00:00:00Z".to_string(),
            status: OrderStatus::Pending,
            tracking_number: Some(format!("TRK-{}", id)),
        }
    }

    #[test]
    fn test_empty_document_decodes_to_empty_collection() {
        assert!(decode_document(EMPTY_DOCUMENT).unwrap().is_empty());
    }

    #[test]
    fn test_document_keeps_order() {
        let orders = vec![order("CMD-2"), order("CMD-1")];
        let bytes = encode_document(&orders).unwrap();
        let decoded = decode_document(&bytes).unwrap();

        assert_eq!(decoded[0].id, "CMD-2");
        assert_eq!(decoded[1].id, "CMD-1");
    }

    #[test]
    fn test_document_is_pretty_printed() {
        let bytes = encode_document(&[order("CMD-1")]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("[\n  {"));
        assert!(text.contains("\"trackingNumber\": \"TRK-CMD-1\""));
    }

    #[test]
    fn test_garbage_is_unreadable() {
        let result = decode_document(b"{not json");
        assert!(matches!(result, Err(StoreError::StorageUnreadable(_))));
    }

    #[test]
    fn test_non_array_is_unreadable() {
        let result = decode_document(br#"{"id":"CMD-1"}"#);
        assert!(matches!(result, Err(StoreError::StorageUnreadable(_))));
    }

    #[test]
    fn test_empty_file_is_unreadable() {
        assert!(matches!(decode_document(b""), Err(StoreError::StorageUnreadable(_))));
    }

    #[test]
    fn test_unknown_status_does_not_spoil_the_document() {
        let mixed = r#"[
            {"id": "CMD-1", "items": [], "total": 0, "date": "2025-01-01T00:00:00Z", "status": "Confirmed"},
            {"id": "CMD-2", "items": [], "total": 0, "date": "2025-01-02T00:00:00Z", "status": "Annulée"}
        ]"#;

        let orders = decode_document(mixed.as_bytes()).unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].status, OrderStatus::Confirmed);
        assert_eq!(orders[1].status, OrderStatus::Other("Annulée".to_string()));

        let reencoded = String::from_utf8(encode_document(&orders).unwrap()).unwrap();
        assert!(reencoded.contains("\"status\": \"Annulée\""));
    }

    #[test]
    fn test_legacy_document_decodes() {
        let legacy = r#"[{
            "id": "CMD-1700000000000",
            "items": [{"id": "3", "name": "Matériaux", "price": 680, "quantity": 1}],
            "total": 816,
            "date": "2023-11-14T22:13:20.000Z",
            "status": "En préparation"
        }]"#;

        let orders = decode_document(legacy.as_bytes()).unwrap();
        assert_eq!(orders[0].status, OrderStatus::Preparing);
        assert_eq!(orders[0].items[0].price, 680.0);
        assert!(orders[0].tracking_number.is_none());
        assert!(orders[0].email.is_none());
    }
}
