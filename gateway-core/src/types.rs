use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use derive_new::new;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{ProviderError, ProviderResult};

/// Account address on the upstream network, in its canonical string encoding.
pub type Address = String;

/// A 32-byte transaction hash, derived from the envelope contents by the
/// envelope parser.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, new)]
pub struct TxHash([u8; 32]);

impl TxHash {
    /// The raw hash bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for TxHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Display for TxHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl Debug for TxHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({self})")
    }
}

impl FromStr for TxHash {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| ProviderError::Request(format!("invalid transaction hash {s:?}: {e}")))?;
        Ok(Self(bytes))
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The fields of a submitted envelope the coordinator actually needs. Derived
/// once per submission and discarded with it.
#[derive(Clone, Debug, new)]
pub struct EnvelopeInfo {
    /// Network hash of the envelope.
    pub hash: TxHash,
    /// The account-local sequence number the transaction declares.
    pub sequence: u64,
    /// Lower bound of a range-based sequence precondition, if the envelope
    /// carries one.
    pub min_seq_num: Option<u64>,
    /// The account the sequence number is bound to.
    pub source_address: Address,
}

/// A terminal, ledger-confirmed outcome for a transaction. Produced by the
/// result store whether the transaction succeeded or failed on-ledger; the
/// two cases are delivered to callers identically.
#[derive(Clone, Debug, Serialize, Deserialize, new)]
pub struct ConfirmedTransaction {
    /// Network hash of the transaction.
    pub hash: TxHash,
    /// The ledger the transaction was applied in.
    pub ledger_sequence: u32,
    /// Whether the transaction succeeded on-ledger.
    pub successful: bool,
    /// Opaque result payload as recorded by the result store.
    pub result: Vec<u8>,
}

/// How the upstream consensus node disposed of a relayed envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelayDisposition {
    /// The node queued the envelope for inclusion in a ledger.
    Accepted,
    /// The node already holds an identical envelope.
    Duplicate,
    /// The node refused the envelope.
    Rejected(RejectReason),
}

/// Why the upstream node refused an envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// The account's committed sequence no longer matches what the
    /// transaction assumed. Transient: the transaction may have just been
    /// applied by another path.
    BadSequence,
    /// Any other rejection, carrying the node's own error code verbatim.
    Other(String),
}

/// Outcome of a single relay attempt, with the wall time it took.
#[derive(Clone, Debug, new)]
pub struct RelayOutcome {
    /// What the node did with the envelope, or why it could not be asked.
    pub disposition: ProviderResult<RelayDisposition>,
    /// Elapsed wall time of the attempt.
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tx_hash_hex_round_trip() {
        let hash = TxHash::from([0xab; 32]);
        let encoded = hash.to_string();
        assert_eq!(encoded.len(), 64);
        assert_eq!(encoded.parse::<TxHash>().unwrap(), hash);
    }

    #[test]
    fn tx_hash_rejects_bad_hex() {
        assert!("zz".repeat(32).parse::<TxHash>().is_err());
        assert!("abcd".parse::<TxHash>().is_err());
    }

    #[test]
    fn tx_hash_serializes_as_hex_string() {
        let hash = TxHash::from([7u8; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{hash}\""));
        let back: TxHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}
