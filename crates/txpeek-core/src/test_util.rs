//! Shared test helpers for `txpeek-core` unit tests.
//!
//! Consolidates fixture txids, a fixed clock, and explorer payload builders
//! so that tests across modules share a single source of truth for dummy
//! data construction.

use time::OffsetDateTime;

use crate::types::TransactionRecord;

// ==============================================================================
// Txid Helpers
// ==============================================================================

/// A well-formed 64-character txid.
pub const SAMPLE_TXID: &str = "6eeee319402dd7693434f005189085264a88b139964ddede641b384e08220f84";

/// Build a 64-character txid that differs from others only in its first
/// byte. Useful when tests only need distinct ids.
pub fn txid_from_byte(b: u8) -> String {
    format!("{b:02x}{}", "0".repeat(62))
}

// ==============================================================================
// Clock and Records
// ==============================================================================

pub fn fixed_time() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("static timestamp is in range")
}

/// A fresh `NotFound` record observed at the fixed test time.
pub fn blank_record(txid: &str) -> TransactionRecord {
    TransactionRecord::new(txid, fixed_time())
}

// ==============================================================================
// Explorer Payloads
// ==============================================================================

/// An Esplora-style `/api/tx` body with the fields the derivation reads
/// plus a few it ignores.
pub fn tx_payload(txid: &str, confirmed: bool, fee: u64, weight: u64, size: u64) -> serde_json::Value {
    serde_json::json!({
        "txid": txid,
        "version": 2,
        "locktime": 0,
        "vin": [],
        "vout": [],
        "size": size,
        "weight": weight,
        "fee": fee,
        "status": { "confirmed": confirmed }
    })
}
