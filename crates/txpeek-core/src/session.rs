//! The visible lookup state, driven by events.
//!
//! A session holds at most one current record and one status message.
//! Every submitted lookup gets a fresh [`RequestToken`]; a resolution only
//! changes the session when it carries the latest token, so a slow answer
//! to an older lookup can never overwrite a newer one.

use serde::Serialize;
use tracing::debug;

use crate::error::LookupError;
use crate::explorer::Endpoint;
use crate::lookup::validate_txid;
use crate::types::{StorageRef, TransactionRecord};

pub const LOADING_MESSAGE: &str = "Loading...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Failure,
}

/// Identifies one submitted lookup. Strictly increasing per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RequestToken(u64);

/// A lookup the caller must now run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub token: RequestToken,
    pub txid: String,
}

pub enum SessionEvent {
    /// The user asked for a txid.
    Submit(String),
    /// A previously issued lookup finished.
    Resolve {
        token: RequestToken,
        outcome: Result<TransactionRecord, LookupError>,
    },
}

#[derive(Debug)]
pub enum Dispatched {
    /// Input accepted; run the lookup described by the ticket.
    Fetch(Ticket),
    /// Input failed validation. The session is already in `Failure`.
    Rejected(LookupError),
    /// The resolution was the latest and is now visible.
    Applied,
    /// The resolution belonged to a superseded lookup and was dropped.
    Stale,
}

#[derive(Debug)]
pub struct LookupSession {
    phase: Phase,
    latest: RequestToken,
    txid: Option<String>,
    record: Option<TransactionRecord>,
    message: Option<String>,
}

impl Default for LookupSession {
    fn default() -> Self {
        Self::new()
    }
}

impl LookupSession {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            latest: RequestToken(0),
            txid: None,
            record: None,
            message: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn record(&self) -> Option<&TransactionRecord> {
        self.record.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn dispatch(&mut self, event: SessionEvent) -> Dispatched {
        match event {
            SessionEvent::Submit(input) => self.submit(&input),
            SessionEvent::Resolve { token, outcome } => self.resolve(token, outcome),
        }
    }

    fn submit(&mut self, input: &str) -> Dispatched {
        // Every submit supersedes whatever is still in flight, valid or not.
        self.latest = RequestToken(self.latest.0 + 1);
        self.record = None;
        let txid = match validate_txid(input) {
            Ok(txid) => txid.to_owned(),
            Err(err) => {
                self.phase = Phase::Failure;
                self.txid = None;
                self.message = Some(err.to_string());
                return Dispatched::Rejected(err);
            }
        };

        self.phase = Phase::Loading;
        self.txid = Some(txid.clone());
        self.message = Some(LOADING_MESSAGE.to_owned());
        Dispatched::Fetch(Ticket {
            token: self.latest,
            txid,
        })
    }

    fn resolve(
        &mut self,
        token: RequestToken,
        outcome: Result<TransactionRecord, LookupError>,
    ) -> Dispatched {
        if token != self.latest {
            debug!(
                token = token.0,
                latest = self.latest.0,
                "discarding superseded lookup result"
            );
            return Dispatched::Stale;
        }

        match outcome {
            Ok(record) => {
                self.phase = Phase::Success;
                self.message = None;
                self.record = Some(record);
            }
            Err(err) => {
                self.phase = Phase::Failure;
                self.message = Some(err.to_string());
                // A negative answer is still a result worth showing.
                self.record = match err {
                    LookupError::RemoteNotFound { record } => Some(*record),
                    _ => None,
                };
            }
        }
        Dispatched::Applied
    }

    /// Snapshot for display. `endpoint` supplies the compare link.
    pub fn view(&self, endpoint: &Endpoint) -> SessionView {
        SessionView {
            phase: self.phase,
            loading: self.phase == Phase::Loading,
            token: self.latest,
            txid: self.txid.clone(),
            message: self.message.clone(),
            storage_ref: self.record.as_ref().and_then(|r| r.storage_ref.clone()),
            compare_url: self.txid.as_deref().map(|txid| endpoint.compare_url(txid)),
            record: self.record.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub phase: Phase,
    pub loading: bool,
    pub token: RequestToken,
    pub txid: Option<String>,
    pub message: Option<String>,
    pub storage_ref: Option<StorageRef>,
    pub compare_url: Option<String>,
    pub record: Option<TransactionRecord>,
}
