use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::errors::StorageError;
use super::types::{FlowStorage, InMemoryFlowStorage};

impl InMemoryFlowStorage {
    pub fn new() -> Self {
        tracing::debug!("Creating new in-memory flow storage");
        Self {
            slot: Mutex::new(None),
        }
    }
}

#[async_trait]
impl FlowStorage for InMemoryFlowStorage {
    async fn get(&self) -> Result<Option<Value>, StorageError> {
        Ok(self.slot.lock().await.clone())
    }

    async fn set(&self, value: Value) -> Result<(), StorageError> {
        *self.slot.lock().await = Some(value);
        Ok(())
    }

    async fn remove(&self) -> Result<(), StorageError> {
        self.slot.lock().await.take();
        Ok(())
    }
}
