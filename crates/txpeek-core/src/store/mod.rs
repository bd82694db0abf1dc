//! Document store abstraction and the transaction upsert built on it.
//!
//! A store holds named collections of JSON documents, each addressed by a
//! store-assigned [`StorageRef`]. Two backends are provided:
//! - [`MemoryStore`]: process-lifetime collections.
//! - [`JsonlStore`]: one `<collection>.jsonl` file per collection under a
//!   directory, rewritten on every mutation.

mod collections;
mod jsonl;
mod memory;
pub mod transactions;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::error::StorageError;
use crate::types::StorageRef;

/// Length of generated document references.
const DOC_REF_LEN: usize = 20;

/// The operations the transaction upsert needs from a document store.
///
/// None of these are transactional with respect to each other.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// References of every document in `collection` whose top-level
    /// `field` equals `value`, in insertion order.
    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<Vec<StorageRef>, StorageError>;

    /// Replace the whole document at `doc_ref`, creating it if absent.
    async fn set(
        &self,
        collection: &str,
        doc_ref: &StorageRef,
        doc: serde_json::Value,
    ) -> Result<(), StorageError>;

    /// Insert a new document under a freshly generated reference.
    async fn add(&self, collection: &str, doc: serde_json::Value)
        -> Result<StorageRef, StorageError>;

    async fn get(
        &self,
        collection: &str,
        doc_ref: &StorageRef,
    ) -> Result<Option<serde_json::Value>, StorageError>;
}

pub(crate) fn new_doc_ref() -> StorageRef {
    let id: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(DOC_REF_LEN)
        .map(char::from)
        .collect();
    StorageRef(id)
}

/// Collection names become file names, so only `[A-Za-z0-9_-]` is allowed.
pub(crate) fn check_collection_name(collection: &str) -> Result<(), StorageError> {
    let valid = !collection.is_empty()
        && collection
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidCollection(collection.to_owned()))
    }
}
