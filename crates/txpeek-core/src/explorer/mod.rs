//! Block explorer abstraction layer.
//!
//! Defines the [`TxExplorer`] trait and provides an Esplora/mempool.space
//! HTTP implementation ([`MempoolClient`]) plus a test mock
//! (`mock::MockExplorer`).

mod endpoint;
mod http_adapter;
#[cfg(test)]
pub mod mock;

pub use endpoint::{Endpoint, MEMPOOL_SPACE};
pub use http_adapter::MempoolClient;

use async_trait::async_trait;

use crate::error::ExplorerError;

/// What the explorer said about a txid.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// 2xx with the decoded JSON body.
    Found(serde_json::Value),
    /// 404. A valid negative answer, not a failure.
    NotFound,
}

/// The one explorer call a lookup needs.
///
/// Implementations make a single attempt: no retries and no backoff.
#[async_trait]
pub trait TxExplorer: Send + Sync {
    async fn fetch_tx(&self, txid: &str) -> Result<FetchOutcome, ExplorerError>;
}
