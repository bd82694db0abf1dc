//! Domain types for txpeek's transaction lookups.
//!
//! Contains the lookup result (`TransactionRecord`), its status
//! classification, the derived fee rate, the explorer payload subset the
//! derivation reads, and the opaque reference a document store assigns.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Required length of a transaction identifier, in characters.
pub const TXID_LEN: usize = 64;

// ==============================================================================
// Status Classification
// ==============================================================================

/// Outcome of a lookup as seen by the explorer. Serialized with the
/// single-letter codes stored documents have always used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxStatus {
    #[serde(rename = "N")]
    NotFound,
    #[serde(rename = "U")]
    Unconfirmed,
    #[serde(rename = "C")]
    Confirmed,
}

impl std::fmt::Display for TxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "Not found"),
            Self::Unconfirmed => write!(f, "Unconfirmed"),
            Self::Confirmed => write!(f, "Confirmed"),
        }
    }
}

// ==============================================================================
// Fee Rate
// ==============================================================================

/// A derived fee rate. The unit depends on whether the transaction is
/// treated as SegWit, so exactly one of the two forms is ever present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeeRate {
    /// Satoshis per virtual byte: `fee / (weight / 4)`.
    PerVByte(f64),
    /// Satoshis per raw byte: `fee / size`.
    PerByte(f64),
}

impl FeeRate {
    pub fn value(&self) -> f64 {
        match self {
            Self::PerVByte(v) | Self::PerByte(v) => *v,
        }
    }
}

// ==============================================================================
// Storage Reference
// ==============================================================================

/// Identifier a document store assigned to a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageRef(pub String);

impl From<String> for StorageRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for StorageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ==============================================================================
// Explorer Payload
// ==============================================================================

/// The fields of an Esplora `/api/tx/{txid}` response that the derivation
/// reads. Everything else is kept only in the opaque raw payload.
#[derive(Debug, Clone, Deserialize)]
pub struct TxPayload {
    pub status: PayloadStatus,
    pub fee: f64,
    pub weight: f64,
    pub size: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayloadStatus {
    pub confirmed: bool,
}

// ==============================================================================
// Transaction Record
// ==============================================================================

/// The result of one lookup. Built fresh for every lookup and never reused.
///
/// The serialized form is also the document written to the store, so field
/// names are part of the stored format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub txid: String,
    pub status: TxStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub observed_at: OffsetDateTime,
    /// Payload returned by the explorer; `None` for `NotFound`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_segwit: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "float_repr"
    )]
    fee_per_vbyte: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "float_repr"
    )]
    fee_per_byte: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_ref: Option<StorageRef>,
}

impl TransactionRecord {
    /// A record in its initial, not-yet-classified state.
    pub fn new(txid: impl Into<String>, observed_at: OffsetDateTime) -> Self {
        Self {
            txid: txid.into(),
            status: TxStatus::NotFound,
            observed_at,
            raw: None,
            is_segwit: None,
            fee_per_vbyte: None,
            fee_per_byte: None,
            storage_ref: None,
        }
    }

    pub fn fee_rate(&self) -> Option<FeeRate> {
        match (self.fee_per_vbyte, self.fee_per_byte) {
            (Some(v), _) => Some(FeeRate::PerVByte(v)),
            (None, Some(v)) => Some(FeeRate::PerByte(v)),
            (None, None) => None,
        }
    }

    /// Store a fee rate, clearing the other unit.
    pub fn set_fee_rate(&mut self, rate: FeeRate) {
        match rate {
            FeeRate::PerVByte(v) => {
                self.fee_per_vbyte = Some(v);
                self.fee_per_byte = None;
            }
            FeeRate::PerByte(v) => {
                self.fee_per_byte = Some(v);
                self.fee_per_vbyte = None;
            }
        }
    }

    pub fn fee_per_vbyte(&self) -> Option<f64> {
        self.fee_per_vbyte
    }

    pub fn fee_per_byte(&self) -> Option<f64> {
        self.fee_per_byte
    }
}

impl std::fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Txid: {}", self.txid)?;
        if self.status != TxStatus::NotFound {
            writeln!(f, "{}", self.status)?;
            writeln!(
                f,
                "Segwit: {} - Check for Segwit is hardcoded as true",
                self.is_segwit.unwrap_or(false)
            )?;
            match self.fee_rate() {
                Some(FeeRate::PerByte(v)) => writeln!(f, "Sat/Byte: {v}")?,
                Some(FeeRate::PerVByte(v)) => writeln!(f, "Sat/VByte: {v}")?,
                None => {}
            }
        }
        write!(f, "Last checked: {}", self.observed_at)
    }
}

// ==============================================================================
// Non-finite float encoding
// ==============================================================================

/// JSON has no representation for infinities or NaN, which a zero weight
/// or size produces. Those are written as the strings `"Infinity"`,
/// `"-Infinity"` and `"NaN"` and read back the same way.
mod float_repr {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            None => s.serialize_none(),
            Some(v) if v.is_finite() => s.serialize_some(v),
            Some(v) if v.is_nan() => s.serialize_some("NaN"),
            Some(v) if v.is_sign_positive() => s.serialize_some("Infinity"),
            Some(_) => s.serialize_some("-Infinity"),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        match Option::<Repr>::deserialize(d)? {
            None => Ok(None),
            Some(Repr::Number(v)) => Ok(Some(v)),
            Some(Repr::Text(text)) => match text.as_str() {
                "NaN" => Ok(Some(f64::NAN)),
                "Infinity" => Ok(Some(f64::INFINITY)),
                "-Infinity" => Ok(Some(f64::NEG_INFINITY)),
                other => Err(D::Error::custom(format!("invalid fee rate `{other}`"))),
            },
        }
    }
}
