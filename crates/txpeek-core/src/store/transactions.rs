//! Upsert of lookup results into the `transactions` collection.

use crate::error::StorageError;
use crate::types::{StorageRef, TransactionRecord};

use super::DocumentStore;

pub const COLLECTION: &str = "transactions";

/// Top-level document field the upsert matches on.
pub const KEY_FIELD: &str = "txid";

/// Insert `record`, or fully replace the first document already stored for
/// its txid. Returns the reference of the written document.
///
/// The query and the write are separate store calls, so two concurrent
/// upserts of a txid that is not stored yet can both insert.
pub async fn upsert(
    store: &dyn DocumentStore,
    record: &TransactionRecord,
) -> Result<StorageRef, StorageError> {
    let doc = to_document(record)?;
    let key = serde_json::Value::String(record.txid.clone());

    let existing = store.find_by_field(COLLECTION, KEY_FIELD, &key).await?;
    let doc_ref = match existing.into_iter().next() {
        Some(doc_ref) => {
            store.set(COLLECTION, &doc_ref, doc).await?;
            doc_ref
        }
        None => store.add(COLLECTION, doc).await?,
    };

    tracing::info!(txid = %record.txid, status = %record.status, %doc_ref, "stored transaction");
    Ok(doc_ref)
}

/// The stored form of a record. The storage reference is metadata of the
/// document, not part of it.
fn to_document(record: &TransactionRecord) -> Result<serde_json::Value, StorageError> {
    let mut doc = serde_json::to_value(record)?;
    if let Some(obj) = doc.as_object_mut() {
        obj.remove("storage_ref");
    }
    Ok(doc)
}
