pub mod derive;
pub mod error;
pub mod explorer;
pub mod lookup;
pub mod session;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_util;

pub use error::{ExplorerError, LookupError, StorageError};
pub use lookup::LookupService;
pub use types::{FeeRate, StorageRef, TransactionRecord, TxStatus};
