//! Explorer base URL handling: validation, per-network defaults, and the
//! API and compare links derived from a txid.

use bitcoin::Network;
use reqwest::Url;

use crate::error::ExplorerError;

pub const MEMPOOL_SPACE: &str = "https://mempool.space";

/// A validated explorer base URL without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: String,
}

impl Endpoint {
    /// Accepts `http://...` or `https://...`; a trailing slash is dropped.
    pub fn parse(base: &str) -> Result<Self, ExplorerError> {
        let parsed = Url::parse(base).map_err(|e| {
            ExplorerError::Endpoint(format!("`{base}` is not an HTTP(S) URL ({e})"))
        })?;
        match parsed.scheme() {
            "http" | "https" => Ok(Self {
                base: base.trim_end_matches('/').to_owned(),
            }),
            other => Err(ExplorerError::Endpoint(format!(
                "unsupported scheme `{other}`; expected http or https"
            ))),
        }
    }

    /// mempool.space instance for a network. Regtest has no public
    /// explorer and must be given an explicit base.
    pub fn for_network(network: Network) -> Result<Self, ExplorerError> {
        let path = match network {
            Network::Bitcoin => "",
            Network::Testnet => "/testnet",
            Network::Signet => "/signet",
            other => {
                return Err(ExplorerError::Endpoint(format!(
                    "no public explorer known for network `{other}`; pass an explicit base URL"
                )))
            }
        };
        Ok(Self {
            base: format!("{MEMPOOL_SPACE}{path}"),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// `GET` target for a transaction's status.
    pub fn api_tx_url(&self, txid: &str) -> String {
        format!("{}/api/tx/{txid}", self.base)
    }

    /// Human-facing page for manually cross-checking a lookup.
    pub fn compare_url(&self, txid: &str) -> String {
        format!("{}/tx/{txid}", self.base)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            base: MEMPOOL_SPACE.to_owned(),
        }
    }
}
