use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::order::Order;
use super::errors::StoreError;
use super::storage::{decode_document, encode_document, OrderStorage, EMPTY_DOCUMENT};

// ============================================================================
// JSON File Storage - single file, single process
// ============================================================================

pub struct JsonFileStorage {
    dir: PathBuf,
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>, file_name: &str) -> Self {
        let dir = dir.into();
        let path = dir.join(file_name);
        Self { dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, source: std::io::Error) -> StoreError {
        StoreError::unavailable(self.path.display().to_string(), source)
    }
}

#[async_trait]
impl OrderStorage for JsonFileStorage {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn ensure(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| self.unavailable(e))?;

        let exists = fs::try_exists(&self.path)
            .await
            .map_err(|e| self.unavailable(e))?;

        if !exists {
            fs::write(&self.path, EMPTY_DOCUMENT)
                .await
                .map_err(|e| self.unavailable(e))?;

            tracing::info!(path = %self.path.display(), "Initialized empty order document");
        }

        Ok(())
    }

    async fn load(&self) -> Result<Vec<Order>, StoreError> {
        let bytes = fs::read(&self.path).await.map_err(|e| self.unavailable(e))?;
        let orders = decode_document(&bytes)?;

        tracing::debug!(
            path = %self.path.display(),
            order_count = orders.len(),
            "Loaded order document"
        );

        Ok(orders)
    }

    async fn save(&self, orders: &[Order]) -> Result<(), StoreError> {
        let bytes = encode_document(orders)?;
        fs::write(&self.path, bytes)
            .await
            .map_err(|e| self.unavailable(e))?;

        tracing::debug!(
            path = %self.path.display(),
            order_count = orders.len(),
            "Rewrote order document"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{OrderItem, OrderStatus};

    fn order(id: &str) -> Order {
        Order {
            id: id.to_string(),
            email: Some("a@b.com".to_string()),
            items: vec![OrderItem::new("1", "Widget", 10.0, 2)],
            total: 24.0,
            date: "2025-01-01T00:00:00Z".to_string(),
            status: OrderStatus::Pending,
            tracking_number: Some(format!("TRK-{}", id)),
        }
    }

    #[tokio::test]
    async fn test_ensure_creates_directory_and_empty_document() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(tmp.path().join("data"), "orders.json");

        storage.ensure().await.unwrap();

        let content = std::fs::read_to_string(storage.path()).unwrap();
        assert_eq!(content, "[]");
    }

    #[tokio::test]
    async fn test_ensure_is_idempotent_and_keeps_content() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(tmp.path(), "orders.json");

        storage.ensure().await.unwrap();
        storage.save(&[order("CMD-1")]).await.unwrap();
        storage.ensure().await.unwrap();

        let orders = storage.load().await.unwrap();
        assert_eq!(orders.len(), 1);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(tmp.path(), "orders.json");
        storage.ensure().await.unwrap();

        storage.save(&[order("CMD-1"), order("CMD-2")]).await.unwrap();
        let orders = storage.load().await.unwrap();

        assert_eq!(orders, vec![order("CMD-1"), order("CMD-2")]);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_unreadable() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(tmp.path(), "orders.json");
        std::fs::write(storage.path(), "garbage").unwrap();

        let result = storage.load().await;
        assert!(matches!(result, Err(StoreError::StorageUnreadable(_))));
    }

    #[tokio::test]
    async fn test_directory_blocked_by_file_is_unavailable() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("data");
        std::fs::write(&blocker, "not a directory").unwrap();

        let storage = JsonFileStorage::new(&blocker, "orders.json");
        let result = storage.ensure().await;

        assert!(matches!(result, Err(StoreError::StorageUnavailable { .. })));
    }
}
