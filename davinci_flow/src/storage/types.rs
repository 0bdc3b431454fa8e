use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::errors::StorageError;

/// A single JSON slot that survives a redirect (browser `sessionStorage`
/// in the original setting).
#[async_trait]
pub trait FlowStorage: Send + Sync {
    async fn get(&self) -> Result<Option<Value>, StorageError>;

    async fn set(&self, value: Value) -> Result<(), StorageError>;

    async fn remove(&self) -> Result<(), StorageError>;
}

#[async_trait]
impl<T: FlowStorage + ?Sized> FlowStorage for Arc<T> {
    async fn get(&self) -> Result<Option<Value>, StorageError> {
        (**self).get().await
    }

    async fn set(&self, value: Value) -> Result<(), StorageError> {
        (**self).set(value).await
    }

    async fn remove(&self) -> Result<(), StorageError> {
        (**self).remove().await
    }
}

/// Process-local slot, lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryFlowStorage {
    pub(super) slot: Mutex<Option<Value>>,
}
