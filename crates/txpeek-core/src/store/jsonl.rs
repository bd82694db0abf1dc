//! JSONL-backed document store.
//!
//! Each collection lives in `<dir>/<collection>.jsonl`, one
//! `{"ref": ..., "doc": ...}` object per line in insertion order. The whole
//! file is rewritten after every mutation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StorageError;
use crate::types::StorageRef;

use super::collections::{Collections, StoredDoc};
use super::{check_collection_name, DocumentStore};

const EXTENSION: &str = "jsonl";

pub struct JsonlStore {
    dir: PathBuf,
    collections: Mutex<Collections>,
}

impl JsonlStore {
    /// Open (creating if needed) a store directory and load every
    /// `*.jsonl` collection already in it.
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(dir)?;

        let mut collections = Collections::default();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if check_collection_name(name).is_err() {
                tracing::warn!(path = %path.display(), "skipping file with unusable collection name");
                continue;
            }

            let content = std::fs::read_to_string(&path)?;
            let docs = parse_jsonl_docs(name, &content)?;
            tracing::debug!(collection = name, docs = docs.len(), "loaded collection");
            collections.replace_docs(name, docs);
        }

        Ok(Self {
            dir: dir.to_owned(),
            collections: Mutex::new(collections),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.{EXTENSION}"))
    }

    /// Write one collection to disk. Called with the lock held so that
    /// concurrent writers cannot interleave file contents.
    async fn flush(&self, collections: &Collections, collection: &str) -> Result<(), StorageError> {
        let content = export_docs_to_jsonl(collections.docs(collection))?;
        tokio::fs::write(self.collection_path(collection), content).await?;
        Ok(())
    }

    /// Apply `mutate` to one collection and flush it. If the flush fails the
    /// collection is restored, so memory never holds what disk rejected.
    async fn mutate_and_flush<T>(
        &self,
        collection: &str,
        mutate: impl FnOnce(&mut Collections) -> T,
    ) -> Result<T, StorageError> {
        let mut collections = self.collections.lock().await;
        let before = collections.docs(collection).to_vec();
        let out = mutate(&mut *collections);
        if let Err(err) = self.flush(&collections, collection).await {
            tracing::warn!(collection, error = %err, "flush failed, rolling back");
            collections.replace_docs(collection, before);
            return Err(err);
        }
        Ok(out)
    }
}

#[async_trait]
impl DocumentStore for JsonlStore {
    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<Vec<StorageRef>, StorageError> {
        check_collection_name(collection)?;
        Ok(self
            .collections
            .lock()
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
        self.mutate_and_flush(collection, |c| c.set(collection, doc_ref, doc))
            .await
    }

    async fn add(
        &self,
        collection: &str,
        doc: serde_json::Value,
    ) -> Result<StorageRef, StorageError> {
        check_collection_name(collection)?;
        self.mutate_and_flush(collection, |c| c.add(collection, doc))
            .await
    }

    async fn get(
        &self,
        collection: &str,
        doc_ref: &StorageRef,
    ) -> Result<Option<serde_json::Value>, StorageError> {
        check_collection_name(collection)?;
        Ok(self.collections.lock().await.get(collection, doc_ref))
    }
}

/// Parse JSONL content into stored documents, skipping empty lines.
/// A repeated ref keeps the later line and is logged as a warning.
fn parse_jsonl_docs(collection: &str, content: &str) -> Result<Vec<StoredDoc>, StorageError> {
    let mut seen = HashSet::new();
    content
        .lines()
        .enumerate()
        .try_fold(Vec::new(), |mut docs: Vec<StoredDoc>, (line_num, line)| {
            let line = line.trim();
            if line.is_empty() {
                return Ok(docs);
            }

            let stored: StoredDoc =
                serde_json::from_str(line).map_err(|e| StorageError::Corrupt {
                    collection: collection.to_owned(),
                    line: line_num + 1,
                    message: e.to_string(),
                })?;
            if !seen.insert(stored.doc_ref.clone()) {
                tracing::warn!(
                    collection,
                    line = line_num + 1,
                    doc_ref = %stored.doc_ref,
                    "duplicate document ref overwrites previous value"
                );
                docs.retain(|d| d.doc_ref != stored.doc_ref);
            }
            docs.push(stored);
            Ok(docs)
        })
}

fn export_docs_to_jsonl(docs: &[StoredDoc]) -> Result<String, StorageError> {
    docs.iter().try_fold(String::new(), |mut out, stored| {
        out.push_str(&serde_json::to_string(stored)?);
        out.push('\n');
        Ok::<_, StorageError>(out)
    })
}
