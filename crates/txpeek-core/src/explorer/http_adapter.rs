//! Esplora REST client over HTTP(S) using `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, trace};

use crate::error::ExplorerError;

use super::endpoint::Endpoint;
use super::{FetchOutcome, TxExplorer};

/// Client for an Esplora-compatible explorer such as mempool.space.
///
/// One `GET {base}/api/tx/{txid}` per call. The request itself has no
/// timeout unless one is configured.
pub struct MempoolClient {
    client: reqwest::Client,
    endpoint: Endpoint,
}

impl MempoolClient {
    pub fn new(
        endpoint: Endpoint,
        connect_timeout: Option<Duration>,
        request_timeout: Option<Duration>,
    ) -> Result<Self, ExplorerError> {
        let mut builder = reqwest::Client::builder().tcp_nodelay(true);
        if let Some(timeout) = connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

#[async_trait]
impl TxExplorer for MempoolClient {
    async fn fetch_tx(&self, txid: &str) -> Result<FetchOutcome, ExplorerError> {
        let url = self.endpoint.api_tx_url(txid);
        debug!(%url, "fetching transaction");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%url, %status, body_len = body.len(), "explorer response");
        trace!(%url, body = %body, "explorer response body");

        if status == StatusCode::NOT_FOUND {
            return Ok(FetchOutcome::NotFound);
        }
        if !status.is_success() {
            return Err(ExplorerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value = serde_json::from_str(&body).map_err(|e| {
            ExplorerError::Decode(format!("decode transaction JSON: {e}"))
        })?;
        Ok(FetchOutcome::Found(value))
    }
}
