//! Status classification and fee-rate derivation for explorer payloads.

use crate::types::{FeeRate, TransactionRecord, TxPayload, TxStatus};

// ==============================================================================
// Classification
// ==============================================================================

#[must_use]
pub fn classify(payload: &TxPayload) -> TxStatus {
    if payload.status.confirmed {
        TxStatus::Confirmed
    } else {
        TxStatus::Unconfirmed
    }
}

/// Whether a payload is treated as SegWit.
///
/// Always `true`: no detection from the payload is performed, so every
/// transaction gets a per-vbyte rate, legacy ones included.
#[must_use]
pub fn is_segwit(_payload: &TxPayload) -> bool {
    true
}

// ==============================================================================
// Fee Rate
// ==============================================================================

/// Plain float division with no rounding and no zero guard. A zero weight
/// or size yields a non-finite rate, which is kept as-is.
#[must_use]
pub fn fee_rate(payload: &TxPayload, segwit: bool) -> FeeRate {
    if segwit {
        FeeRate::PerVByte(payload.fee / (payload.weight / 4.0))
    } else {
        FeeRate::PerByte(payload.fee / payload.size)
    }
}

/// Fill the derived fields of `record` from a successful explorer answer.
pub fn apply(record: &mut TransactionRecord, payload: &TxPayload, raw: serde_json::Value) {
    let segwit = is_segwit(payload);
    record.raw = Some(raw);
    record.is_segwit = Some(segwit);
    record.status = classify(payload);
    record.set_fee_rate(fee_rate(payload, segwit));
}
