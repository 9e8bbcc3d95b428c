use std::collections::HashMap;

use async_trait::async_trait;

use crate::{Address, ConfirmedTransaction, EnvelopeInfo, ProviderResult, RelayOutcome, TxHash};

/// The store of historical, ledger-confirmed transaction results.
///
/// `Ok(None)` is an authoritative "this transaction has no recorded outcome",
/// distinct from an `Err`, which means the store itself could not answer.
/// Callers branch on that distinction, so implementations must not collapse
/// one into the other.
#[async_trait]
pub trait TxResultStore: Send + Sync {
    /// Look up the terminal result for a transaction hash.
    async fn transaction_by_hash(
        &self,
        hash: &TxHash,
    ) -> ProviderResult<Option<ConfirmedTransaction>>;
}

/// Batched lookup of committed account sequences.
#[async_trait]
pub trait SequenceProvider: Send + Sync {
    /// Current committed sequence for each requested address. Addresses
    /// absent from the returned map do not exist upstream.
    async fn sequences_for(&self, addresses: &[Address]) -> ProviderResult<HashMap<Address, u64>>;
}

/// The sole point of contact with the upstream consensus node.
///
/// Implementations are expected to enforce their own request deadline and
/// report elapsed wall time for every attempt, including failed ones.
#[async_trait]
pub trait RelayClient: Send + Sync {
    /// Forward a raw envelope to the node exactly once.
    async fn submit_envelope(&self, raw_envelope: &[u8]) -> RelayOutcome;
}

/// Decodes an opaque signed envelope into the fields the coordinator needs.
pub trait EnvelopeParser: Send + Sync {
    /// Parse a raw envelope, deriving its network hash.
    fn parse(&self, raw_envelope: &[u8]) -> ProviderResult<EnvelopeInfo>;
}
