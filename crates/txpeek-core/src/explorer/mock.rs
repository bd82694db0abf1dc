use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::ExplorerError;

use super::{FetchOutcome, TxExplorer};

#[derive(Clone)]
enum Reply {
    Found(serde_json::Value),
    Status(u16, String),
}

/// A mock explorer for testing. Returns canned replies from a `HashMap`
/// populated via the builder pattern; unknown txids answer 404. Counts
/// every call so tests can assert that no request was made.
pub struct MockExplorer {
    replies: HashMap<String, Reply>,
    calls: AtomicUsize,
}

impl MockExplorer {
    pub fn builder() -> MockExplorerBuilder {
        MockExplorerBuilder {
            replies: HashMap::new(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub struct MockExplorerBuilder {
    replies: HashMap<String, Reply>,
}

impl MockExplorerBuilder {
    pub fn with_tx(mut self, txid: &str, payload: serde_json::Value) -> Self {
        self.replies.insert(txid.to_owned(), Reply::Found(payload));
        self
    }

    pub fn with_status(mut self, txid: &str, status: u16, body: &str) -> Self {
        self.replies
            .insert(txid.to_owned(), Reply::Status(status, body.to_owned()));
        self
    }

    pub fn build(self) -> MockExplorer {
        MockExplorer {
            replies: self.replies,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TxExplorer for MockExplorer {
    async fn fetch_tx(&self, txid: &str) -> Result<FetchOutcome, ExplorerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.replies.get(txid).cloned() {
            Some(Reply::Found(payload)) => Ok(FetchOutcome::Found(payload)),
            Some(Reply::Status(404, _)) | None => Ok(FetchOutcome::NotFound),
            Some(Reply::Status(status, body)) => Err(ExplorerError::Status { status, body }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{tx_payload, txid_from_byte};

    #[tokio::test]
    async fn unknown_txid_answers_not_found() {
        let explorer = MockExplorer::builder().build();
        let outcome = explorer.fetch_tx(&txid_from_byte(9)).await.unwrap();
        assert_eq!(outcome, FetchOutcome::NotFound);
        assert_eq!(explorer.calls(), 1);
    }

    #[tokio::test]
    async fn canned_replies_are_returned() {
        let found = txid_from_byte(1);
        let broken = txid_from_byte(2);
        let explorer = MockExplorer::builder()
            .with_tx(&found, tx_payload(&found, false, 1, 4, 1))
            .with_status(&broken, 503, "busy")
            .build();

        assert!(matches!(
            explorer.fetch_tx(&found).await.unwrap(),
            FetchOutcome::Found(_)
        ));
        let err = explorer.fetch_tx(&broken).await.unwrap_err();
        assert_eq!(err.to_string(), "busy");
        assert_eq!(explorer.calls(), 2);
    }
}
