//! The lookup workflow: validate a txid, ask the explorer, classify and
//! derive, then optionally persist.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::derive;
use crate::error::LookupError;
use crate::explorer::{FetchOutcome, TxExplorer};
use crate::store::{transactions, DocumentStore};
use crate::types::{TransactionRecord, TxPayload, TXID_LEN};

/// Trim user input and check it is shaped like a txid. Only the length is
/// checked; the characters themselves are not validated.
pub fn validate_txid(input: &str) -> Result<&str, LookupError> {
    let txid = input.trim();
    if txid.is_empty() {
        return Err(LookupError::EmptyId);
    }
    let len = txid.chars().count();
    if len != TXID_LEN {
        return Err(LookupError::InvalidLength { len });
    }
    Ok(txid)
}

/// Runs lookups against one explorer and, when configured, one store.
///
/// Each call is a single attempt with no retries. Concurrent calls are
/// independent; ordering between them is the caller's concern.
#[derive(Clone)]
pub struct LookupService {
    explorer: Arc<dyn TxExplorer>,
    store: Option<Arc<dyn DocumentStore>>,
}

impl LookupService {
    pub fn new(explorer: Arc<dyn TxExplorer>, store: Option<Arc<dyn DocumentStore>>) -> Self {
        Self { explorer, store }
    }

    pub fn persists(&self) -> bool {
        self.store.is_some()
    }

    /// Look up one transaction.
    ///
    /// A 404 from the explorer is persisted like any other result and then
    /// reported as [`LookupError::RemoteNotFound`], which still carries the
    /// negative record.
    pub async fn lookup(&self, input: &str) -> Result<TransactionRecord, LookupError> {
        let txid = validate_txid(input)?;
        let mut record = TransactionRecord::new(txid, OffsetDateTime::now_utc());
        info!(txid, "looking up transaction");

        match self.explorer.fetch_tx(txid).await? {
            FetchOutcome::NotFound => {
                debug!(txid, "explorer does not know transaction");
                self.persist(&mut record).await?;
                Err(LookupError::RemoteNotFound {
                    record: Box::new(record),
                })
            }
            FetchOutcome::Found(raw) => {
                let payload: TxPayload = serde_json::from_value(raw.clone()).map_err(|e| {
                    LookupError::Remote(format!("invalid transaction payload: {e}"))
                })?;
                derive::apply(&mut record, &payload, raw);
                debug!(
                    txid,
                    status = %record.status,
                    fee_rate = ?record.fee_rate(),
                    "derived transaction metrics"
                );
                self.persist(&mut record).await?;
                Ok(record)
            }
        }
    }

    async fn persist(&self, record: &mut TransactionRecord) -> Result<(), LookupError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        match transactions::upsert(store.as_ref(), record).await {
            Ok(doc_ref) => {
                record.storage_ref = Some(doc_ref);
                Ok(())
            }
            Err(err) => {
                warn!(txid = %record.txid, error = %err, "failed to store transaction");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::StorageError;
    use crate::explorer::mock::MockExplorer;
    use crate::store::transactions::COLLECTION;
    use crate::store::MemoryStore;
    use crate::test_util::{tx_payload, txid_from_byte, SAMPLE_TXID};
    use crate::types::{FeeRate, StorageRef, TxStatus};

    fn service(explorer: MockExplorer) -> (LookupService, Arc<MockExplorer>) {
        let explorer = Arc::new(explorer);
        (LookupService::new(explorer.clone(), None), explorer)
    }

    fn persisting_service(
        explorer: MockExplorer,
    ) -> (LookupService, Arc<MockExplorer>, Arc<MemoryStore>) {
        let explorer = Arc::new(explorer);
        let store = Arc::new(MemoryStore::new());
        let service = LookupService::new(explorer.clone(), Some(store.clone()));
        (service, explorer, store)
    }

    /// A store whose writes always fail.
    struct BrokenStore;

    #[async_trait]
    impl DocumentStore for BrokenStore {
        async fn find_by_field(
            &self,
            _collection: &str,
            _field: &str,
            _value: &serde_json::Value,
        ) -> Result<Vec<StorageRef>, StorageError> {
            Ok(Vec::new())
        }

        async fn set(
            &self,
            _collection: &str,
            _doc_ref: &StorageRef,
            _doc: serde_json::Value,
        ) -> Result<(), StorageError> {
            Err(std::io::Error::other("disk full").into())
        }

        async fn add(
            &self,
            _collection: &str,
            _doc: serde_json::Value,
        ) -> Result<StorageRef, StorageError> {
            Err(std::io::Error::other("disk full").into())
        }

        async fn get(
            &self,
            _collection: &str,
            _doc_ref: &StorageRef,
        ) -> Result<Option<serde_json::Value>, StorageError> {
            Ok(None)
        }
    }

    /// Wraps a [`MemoryStore`] and counts calls per operation.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        finds: AtomicUsize,
        sets: AtomicUsize,
        adds: AtomicUsize,
    }

    impl CountingStore {
        fn counts(&self) -> (usize, usize, usize) {
            (
                self.finds.load(Ordering::SeqCst),
                self.sets.load(Ordering::SeqCst),
                self.adds.load(Ordering::SeqCst),
            )
        }
    }

    #[async_trait]
    impl DocumentStore for CountingStore {
        async fn find_by_field(
            &self,
            collection: &str,
            field: &str,
            value: &serde_json::Value,
        ) -> Result<Vec<StorageRef>, StorageError> {
            self.finds.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_field(collection, field, value).await
        }

        async fn set(
            &self,
            collection: &str,
            doc_ref: &StorageRef,
            doc: serde_json::Value,
        ) -> Result<(), StorageError> {
            self.sets.fetch_add(1, Ordering::SeqCst);
            self.inner.set(collection, doc_ref, doc).await
        }

        async fn add(
            &self,
            collection: &str,
            doc: serde_json::Value,
        ) -> Result<StorageRef, StorageError> {
            self.adds.fetch_add(1, Ordering::SeqCst);
            self.inner.add(collection, doc).await
        }

        async fn get(
            &self,
            collection: &str,
            doc_ref: &StorageRef,
        ) -> Result<Option<serde_json::Value>, StorageError> {
            self.inner.get(collection, doc_ref).await
        }
    }

    fn counting_service(explorer: MockExplorer) -> (LookupService, Arc<CountingStore>) {
        let store = Arc::new(CountingStore::default());
        let service = LookupService::new(Arc::new(explorer), Some(store.clone()));
        (service, store)
    }

    // ==========================================================================
    // Validation
    // ==========================================================================

    #[test]
    fn validate_rejects_empty_and_blank() {
        assert!(matches!(validate_txid(""), Err(LookupError::EmptyId)));
        assert!(matches!(validate_txid("   "), Err(LookupError::EmptyId)));
    }

    #[test]
    fn validate_rejects_wrong_lengths() {
        for len in [1, 63, 65, 72] {
            let input = "a".repeat(len);
            assert!(
                matches!(validate_txid(&input), Err(LookupError::InvalidLength { len: l }) if l == len),
                "length {len} must be rejected"
            );
        }
    }

    #[test]
    fn validate_trims_and_does_not_check_characters() {
        let input = format!("  {}  ", "z".repeat(64));
        assert_eq!(validate_txid(&input).unwrap(), "z".repeat(64));
    }

    #[test]
    fn validate_counts_characters_not_bytes() {
        assert!(validate_txid(&"é".repeat(64)).is_ok());
    }

    #[test]
    fn validation_messages_match_status_lines() {
        assert_eq!(LookupError::EmptyId.to_string(), "Txid should not be empty");
        assert_eq!(
            LookupError::InvalidLength { len: 3 }.to_string(),
            "Txid should be 64 characters long"
        );
    }

    #[tokio::test]
    async fn invalid_input_makes_no_network_call() {
        let (service, explorer) = service(MockExplorer::builder().build());
        let too_long = "f".repeat(72);
        for input in ["", "abc", too_long.as_str()] {
            let err = service.lookup(input).await.unwrap_err();
            assert!(err.is_validation());
        }
        assert_eq!(explorer.calls(), 0);
    }

    #[tokio::test]
    async fn sample_txid_passes_validation_and_is_fetched() {
        let (service, explorer) = service(MockExplorer::builder().build());
        let err = service.lookup(SAMPLE_TXID).await.unwrap_err();
        assert!(matches!(err, LookupError::RemoteNotFound { .. }));
        assert_eq!(explorer.calls(), 1);
    }

    // ==========================================================================
    // Classification and derivation
    // ==========================================================================

    #[tokio::test]
    async fn confirmed_payload_yields_confirmed_record() {
        let (service, _) = service(
            MockExplorer::builder()
                .with_tx(SAMPLE_TXID, tx_payload(SAMPLE_TXID, true, 1410, 561, 222))
                .build(),
        );
        let record = service.lookup(SAMPLE_TXID).await.unwrap();

        assert_eq!(record.txid, SAMPLE_TXID);
        assert_eq!(record.status, TxStatus::Confirmed);
        assert_eq!(record.is_segwit, Some(true));
        assert_eq!(record.fee_per_vbyte(), Some(1410.0 / (561.0 / 4.0)));
        assert_eq!(record.fee_per_byte(), None);
        assert!(record.raw.is_some());
        assert!(record.storage_ref.is_none());
    }

    #[tokio::test]
    async fn unconfirmed_payload_yields_unconfirmed_record() {
        let txid = txid_from_byte(7);
        let (service, _) = service(
            MockExplorer::builder()
                .with_tx(&txid, tx_payload(&txid, false, 300, 600, 200))
                .build(),
        );
        let record = service.lookup(&txid).await.unwrap();
        assert_eq!(record.status, TxStatus::Unconfirmed);
        assert_eq!(record.fee_rate(), Some(FeeRate::PerVByte(2.0)));
    }

    #[tokio::test]
    async fn zero_weight_produces_infinite_rate() {
        let (service, _) = service(
            MockExplorer::builder()
                .with_tx(SAMPLE_TXID, tx_payload(SAMPLE_TXID, false, 300, 0, 0))
                .build(),
        );
        let record = service.lookup(SAMPLE_TXID).await.unwrap();
        assert_eq!(record.fee_per_vbyte(), Some(f64::INFINITY));
    }

    #[tokio::test]
    async fn payload_missing_fields_is_a_remote_error() {
        let (service, _) = service(
            MockExplorer::builder()
                .with_tx(SAMPLE_TXID, serde_json::json!({ "txid": SAMPLE_TXID }))
                .build(),
        );
        let err = service.lookup(SAMPLE_TXID).await.unwrap_err();
        assert!(matches!(err, LookupError::Remote(msg) if msg.contains("invalid transaction payload")));
    }

    // ==========================================================================
    // Remote failures
    // ==========================================================================

    #[tokio::test]
    async fn server_error_surfaces_body_text() {
        let (service, _) = service(
            MockExplorer::builder()
                .with_status(SAMPLE_TXID, 500, "server error")
                .build(),
        );
        let err = service.lookup(SAMPLE_TXID).await.unwrap_err();
        assert!(matches!(&err, LookupError::Remote(msg) if msg == "server error"));
        assert_eq!(err.to_string(), "server error");
    }

    #[tokio::test]
    async fn remote_error_persists_nothing() {
        let (service, _, store) = persisting_service(
            MockExplorer::builder()
                .with_status(SAMPLE_TXID, 502, "bad gateway")
                .build(),
        );
        assert!(service.lookup(SAMPLE_TXID).await.is_err());
        assert_eq!(store.len(COLLECTION).await, 0);
    }

    // ==========================================================================
    // Persistence
    // ==========================================================================

    #[tokio::test]
    async fn not_found_is_persisted_once_then_reported() {
        let (service, _, store) = persisting_service(MockExplorer::builder().build());
        let err = service.lookup(SAMPLE_TXID).await.unwrap_err();

        assert_eq!(err.to_string(), "Transaction not found");
        let LookupError::RemoteNotFound { record } = err else {
            panic!("expected RemoteNotFound");
        };
        assert_eq!(record.status, TxStatus::NotFound);
        assert!(record.raw.is_none());
        let doc_ref = record.storage_ref.clone().expect("negative record is stored");

        assert_eq!(store.len(COLLECTION).await, 1);
        let doc = store.get(COLLECTION, &doc_ref).await.unwrap().unwrap();
        assert_eq!(doc["status"], "N");
    }

    #[tokio::test]
    async fn success_is_persisted_with_reference() {
        let (service, _, store) = persisting_service(
            MockExplorer::builder()
                .with_tx(SAMPLE_TXID, tx_payload(SAMPLE_TXID, true, 1000, 400, 100))
                .build(),
        );
        let record = service.lookup(SAMPLE_TXID).await.unwrap();
        let doc_ref = record.storage_ref.clone().expect("record is stored");

        let doc = store.get(COLLECTION, &doc_ref).await.unwrap().unwrap();
        assert_eq!(doc["status"], "C");
        assert_eq!(doc["fee_per_vbyte"], 10.0);
    }

    #[tokio::test]
    async fn not_found_upserts_exactly_once() {
        let (service, store) = counting_service(MockExplorer::builder().build());
        let err = service.lookup(SAMPLE_TXID).await.unwrap_err();
        assert!(matches!(err, LookupError::RemoteNotFound { .. }));
        // One query, then one insert for a txid not seen before.
        assert_eq!(store.counts(), (1, 0, 1));
    }

    #[tokio::test]
    async fn success_upserts_exactly_once() {
        let (service, store) = counting_service(
            MockExplorer::builder()
                .with_tx(SAMPLE_TXID, tx_payload(SAMPLE_TXID, false, 500, 400, 100))
                .build(),
        );
        service.lookup(SAMPLE_TXID).await.unwrap();
        assert_eq!(store.counts(), (1, 0, 1));

        service.lookup(SAMPLE_TXID).await.unwrap();
        assert_eq!(store.counts(), (2, 1, 1));
    }

    #[tokio::test]
    async fn invalid_input_touches_no_store() {
        let (service, store) = counting_service(MockExplorer::builder().build());
        assert!(service.lookup("abc").await.is_err());
        assert_eq!(store.counts(), (0, 0, 0));
    }

    #[tokio::test]
    async fn repeated_lookups_reuse_the_stored_document() {
        let (service, _, store) = persisting_service(MockExplorer::builder().build());
        let _ = service.lookup(SAMPLE_TXID).await;
        let _ = service.lookup(SAMPLE_TXID).await;
        assert_eq!(store.len(COLLECTION).await, 1);
    }

    #[tokio::test]
    async fn storage_failure_is_surfaced() {
        let explorer = Arc::new(
            MockExplorer::builder()
                .with_tx(SAMPLE_TXID, tx_payload(SAMPLE_TXID, true, 1000, 400, 100))
                .build(),
        );
        let service = LookupService::new(explorer, Some(Arc::new(BrokenStore)));
        let err = service.lookup(SAMPLE_TXID).await.unwrap_err();
        assert!(matches!(err, LookupError::Storage(_)));
        assert!(err.to_string().contains("disk full"));
    }
}
