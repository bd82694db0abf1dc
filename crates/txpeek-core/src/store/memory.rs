use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::types::StorageRef;

use super::collections::Collections;
use super::{check_collection_name, DocumentStore};

/// Document store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently in `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections.read().await.docs(collection).len()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<Vec<StorageRef>, StorageError> {
        check_collection_name(collection)?;
        Ok(self
            .collections
            .read()
            .await
            .find_by_field(collection, field, value))
    }

    async fn set(
        &self,
        collection: &str,
        doc_ref: &StorageRef,
        doc: serde_json::Value,
    ) -> Result<(), StorageError> {
        check_collection_name(collection)?;
        self.collections.write().await.set(collection, doc_ref, doc);
        Ok(())
    }

    async fn add(
        &self,
        collection: &str,
        doc: serde_json::Value,
    ) -> Result<StorageRef, StorageError> {
        check_collection_name(collection)?;
        Ok(self.collections.write().await.add(collection, doc))
    }

    async fn get(
        &self,
        collection: &str,
        doc_ref: &StorageRef,
    ) -> Result<Option<serde_json::Value>, StorageError> {
        check_collection_name(collection)?;
        Ok(self.collections.read().await.get(collection, doc_ref))
    }
}
