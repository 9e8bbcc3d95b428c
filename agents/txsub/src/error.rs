use gateway_core::{ConfirmedTransaction, ProviderError};

/// The terminal answer handed to a submit caller: a ledger-confirmed
/// transaction (successful or not) or the reason no confirmation will come.
pub type SubmissionResult = Result<ConfirmedTransaction, SubmitError>;

/// Everything a submit caller can be told went wrong.
///
/// Cloneable because one terminal answer may be fanned out to several
/// callers waiting on the same transaction hash.
#[derive(Clone, Debug, thiserror::Error)]
pub enum SubmitError {
    /// The submitted payload is not a valid transaction envelope.
    #[error("malformed transaction envelope: {0}")]
    MalformedEnvelope(String),
    /// The source account does not exist upstream. Matches the answer the
    /// consensus node itself would give.
    #[error("source account does not exist")]
    NoAccount,
    /// The declared sequence number can no longer become valid for the
    /// source account.
    #[error("transaction sequence number is no longer valid for the source account")]
    BadSequence,
    /// The caller abandoned the submission before an answer arrived.
    #[error("submission canceled by the caller")]
    Canceled,
    /// The submission was accepted upstream but no ledger outcome appeared
    /// within the coordinator's patience.
    #[error("submission timed out awaiting a ledger outcome")]
    Timeout,
    /// The coordinator is holding its maximum number of queued submissions.
    #[error("submission queue is at capacity")]
    QueueFull,
    /// The upstream node refused the envelope for a reason other than a
    /// stale sequence; carries the node's error code verbatim.
    #[error("upstream node rejected the envelope: {0}")]
    RelayRejected(String),
    /// The relay attempt itself failed; nothing was (knowingly) submitted.
    #[error("relay attempt failed")]
    Relay(#[source] ProviderError),
    /// A backing-store lookup failed; surfaced unchanged to the caller.
    #[error("backing store lookup failed")]
    Provider(#[source] ProviderError),
}

impl SubmitError {
    /// Stable label for the outcome counter.
    pub(crate) fn metric_label(&self) -> &'static str {
        match self {
            Self::MalformedEnvelope(_) => "malformed",
            Self::NoAccount => "no_account",
            Self::BadSequence => "bad_sequence",
            Self::Canceled => "canceled",
            Self::Timeout => "timeout",
            Self::QueueFull => "queue_full",
            Self::RelayRejected(_) => "relay_rejected",
            Self::Relay(_) => "relay_error",
            Self::Provider(_) => "provider_error",
        }
    }
}
