use crate::types::TransactionRecord;

/// Failures talking to a block explorer.
#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// A non-2xx, non-404 answer. Displays as the response body.
    #[error("{body}")]
    Status { status: u16, body: String },

    #[error("invalid explorer response: {0}")]
    Decode(String),

    #[error("invalid explorer endpoint: {0}")]
    Endpoint(String),
}

/// Failures of the document store and the transaction upsert built on it.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("corrupt collection `{collection}` at line {line}: {message}")]
    Corrupt {
        collection: String,
        line: usize,
        message: String,
    },

    #[error("invalid collection name `{0}`")]
    InvalidCollection(String),
}

/// Every way a lookup can end without a displayable success record.
///
/// `Display` is the human-readable status line shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Txid should not be empty")]
    EmptyId,

    #[error("Txid should be 64 characters long")]
    InvalidLength { len: usize },

    /// The explorer answered 404. The negative record has already been
    /// persisted (when a store is configured) and stays displayable.
    #[error("Transaction not found")]
    RemoteNotFound { record: Box<TransactionRecord> },

    /// Any other non-2xx answer (carrying the body text), a transport
    /// failure, or an undecodable 2xx body.
    #[error("{0}")]
    Remote(String),

    #[error("failed to store transaction: {0}")]
    Storage(#[from] StorageError),
}

impl From<ExplorerError> for LookupError {
    fn from(err: ExplorerError) -> Self {
        Self::Remote(err.to_string())
    }
}

impl LookupError {
    /// Validation failures happen before any network access.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyId | Self::InvalidLength { .. })
    }
}
