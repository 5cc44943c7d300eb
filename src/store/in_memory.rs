use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::order::Order;
use super::errors::StoreError;
use super::storage::{decode_document, encode_document, OrderStorage, EMPTY_DOCUMENT};

/// Keeps the serialized order document in memory. Holding raw bytes rather
/// than decoded orders keeps the same corrupt-content behavior as the file
/// adapter.
#[derive(Default)]
pub struct InMemoryStorage {
    document: Mutex<Option<Vec<u8>>>,
    unavailable: bool,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an arbitrary document, valid or not.
    pub fn with_document(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            document: Mutex::new(Some(bytes.into())),
            unavailable: false,
        }
    }

    /// A medium that refuses every access.
    pub fn unavailable() -> Self {
        Self {
            document: Mutex::new(None),
            unavailable: true,
        }
    }

    pub async fn document(&self) -> Option<Vec<u8>> {
        self.document.lock().await.clone()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::unavailable(
                self.location(),
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "medium disabled"),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStorage for InMemoryStorage {
    fn location(&self) -> String {
        "memory".to_string()
    }

    async fn ensure(&self) -> Result<(), StoreError> {
        self.check_available()?;
        let mut document = self.document.lock().await;
        if document.is_none() {
            *document = Some(EMPTY_DOCUMENT.to_vec());
        }
        Ok(())
    }

    async fn load(&self) -> Result<Vec<Order>, StoreError> {
        self.check_available()?;
        match self.document.lock().await.as_deref() {
            Some(bytes) => decode_document(bytes),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, orders: &[Order]) -> Result<(), StoreError> {
        self.check_available()?;
        let bytes = encode_document(orders)?;
        *self.document.lock().await = Some(bytes);
        Ok(())
    }
}
