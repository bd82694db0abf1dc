use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::StorageRef;

use super::new_doc_ref;

/// A document together with its reference. Also the JSONL line format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(super) struct StoredDoc {
    #[serde(rename = "ref")]
    pub(super) doc_ref: StorageRef,
    pub(super) doc: serde_json::Value,
}

/// Insertion-ordered collections shared by the store backends.
#[derive(Debug, Default)]
pub(super) struct Collections {
    by_name: HashMap<String, Vec<StoredDoc>>,
}

impl Collections {
    pub(super) fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &serde_json::Value,
    ) -> Vec<StorageRef> {
        self.docs(collection)
            .iter()
            .filter(|stored| stored.doc.get(field) == Some(value))
            .map(|stored| stored.doc_ref.clone())
            .collect()
    }

    pub(super) fn set(&mut self, collection: &str, doc_ref: &StorageRef, doc: serde_json::Value) {
        let docs = self.by_name.entry(collection.to_owned()).or_default();
        match docs.iter_mut().find(|stored| &stored.doc_ref == doc_ref) {
            Some(stored) => stored.doc = doc,
            None => docs.push(StoredDoc {
                doc_ref: doc_ref.clone(),
                doc,
            }),
        }
    }

    pub(super) fn add(&mut self, collection: &str, doc: serde_json::Value) -> StorageRef {
        let doc_ref = new_doc_ref();
        self.by_name
            .entry(collection.to_owned())
            .or_default()
            .push(StoredDoc {
                doc_ref: doc_ref.clone(),
                doc,
            });
        doc_ref
    }

    pub(super) fn get(&self, collection: &str, doc_ref: &StorageRef) -> Option<serde_json::Value> {
        self.docs(collection)
            .iter()
            .find(|stored| &stored.doc_ref == doc_ref)
            .map(|stored| stored.doc.clone())
    }

    pub(super) fn docs(&self, collection: &str) -> &[StoredDoc] {
        self.by_name
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(super) fn replace_docs(&mut self, collection: &str, docs: Vec<StoredDoc>) {
        self.by_name.insert(collection.to_owned(), docs);
    }
}
