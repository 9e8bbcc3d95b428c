use std::sync::Arc;

use std::time::Duration;

use tokio::sync::{oneshot, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use gateway_core::{
    EnvelopeParser, ProviderError, RejectReason, RelayClient, RelayDisposition, SequenceProvider,
    TxResultStore,
};

use crate::error::{SubmissionResult, SubmitError};
use crate::metrics::SubmissionMetrics;
use crate::open_tracker::OpenSubmissionTracker;
use crate::queue_map::SubmissionQueues;
use crate::settings::TxSubSettings;

/// The transaction-submission coordinator.
///
/// Deduplicates submissions against the result store, holds each one until
/// its account's committed sequence makes it valid, relays it exactly once,
/// and fans the eventual ledger outcome out to every caller waiting on the
/// same transaction hash. Submissions for unrelated accounts never contend
/// on a shared lock.
///
/// Queue state is rebuilt purely from new submissions; nothing here survives
/// a restart.
pub struct SubmissionSystem {
    parser: Arc<dyn EnvelopeParser>,
    results: Arc<dyn TxResultStore>,
    sequences: Arc<dyn SequenceProvider>,
    relay: Arc<dyn RelayClient>,
    queues: SubmissionQueues,
    open: OpenSubmissionTracker,
    open_timeout: Duration,
    /// Non-reentrant guard: an overlapping reconciliation pass is skipped,
    /// not queued, so a slow result store cannot pile passes up.
    tick_guard: Mutex<()>,
    metrics: SubmissionMetrics,
}

impl SubmissionSystem {
    /// Wire the coordinator up to its backing services.
    pub fn new(
        settings: &TxSubSettings,
        parser: Arc<dyn EnvelopeParser>,
        results: Arc<dyn TxResultStore>,
        sequences: Arc<dyn SequenceProvider>,
        relay: Arc<dyn RelayClient>,
        metrics: SubmissionMetrics,
    ) -> Self {
        Self {
            parser,
            results,
            sequences,
            relay,
            queues: SubmissionQueues::new(
                settings.queue_idle_timeout(),
                settings.max_queued_submissions,
            ),
            open: OpenSubmissionTracker::new(),
            open_timeout: settings.open_submission_timeout(),
            tick_guard: Mutex::new(()),
            metrics,
        }
    }

    /// Submit a raw transaction envelope and wait for its terminal answer.
    ///
    /// Exactly one answer is produced per call. Cancelling `cancel` abandons
    /// the wait with [`SubmitError::Canceled`]; it cannot retract a relay
    /// attempt that has already been issued, and it leaves any queue entry
    /// for the queue's own timeout to collect.
    #[instrument(skip_all)]
    pub async fn submit(&self, raw_envelope: &[u8], cancel: &CancellationToken) -> SubmissionResult {
        let result = self.submit_inner(raw_envelope, cancel).await;
        self.metrics.observe_submission(&result);
        self.metrics
            .queued_submissions
            .set(self.queues.size().await as i64);
        result
    }

    async fn submit_inner(
        &self,
        raw_envelope: &[u8],
        cancel: &CancellationToken,
    ) -> SubmissionResult {
        let info = self.parser.parse(raw_envelope).map_err(|err| match err {
            ProviderError::MalformedEnvelope(msg) => SubmitError::MalformedEnvelope(msg),
            other => SubmitError::MalformedEnvelope(other.to_string()),
        })?;
        let hash = info.hash;
        debug!(
            tx_hash = %hash,
            account = %info.source_address,
            sequence = info.sequence,
            "processing submission"
        );

        // Idempotent fast path: a resubmission of something already on
        // ledger gets its recorded outcome back without touching the node.
        if let Some(tx) = self
            .results
            .transaction_by_hash(&hash)
            .await
            .map_err(SubmitError::Provider)?
        {
            debug!(tx_hash = %hash, "submission already has a ledger outcome");
            return Ok(tx);
        }

        let current_sequence = {
            let addresses = std::slice::from_ref(&info.source_address);
            let mut sequences = self
                .sequences
                .sequences_for(addresses)
                .await
                .map_err(SubmitError::Provider)?;
            sequences
                .remove(&info.source_address)
                .ok_or(SubmitError::NoAccount)?
        };

        // Enqueue, then feed the fetched sequence straight back in. The two
        // steps are deliberately not atomic: a concurrent update to the same
        // account in between is absorbed because notification is monotonic
        // and idempotent.
        let release = self
            .queues
            .push(&info.source_address, info.sequence, info.min_seq_num)
            .await;
        self.queues
            .notify_account(&info.source_address, current_sequence)
            .await;

        let released = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(tx_hash = %hash, "caller canceled while waiting for its sequence window");
                return Err(SubmitError::Canceled);
            }
            released = release => {
                // The queue delivers a value to every conduit it owns while
                // the coordinator is alive; a closed conduit means shutdown.
                released.unwrap_or(Err(SubmitError::Canceled))
            }
        };
        released?;

        let outcome = self.relay.submit_envelope(raw_envelope).await;
        self.metrics
            .relay_duration
            .observe(outcome.elapsed.as_secs_f64());
        debug!(
            tx_hash = %hash,
            elapsed = ?outcome.elapsed,
            disposition = ?outcome.disposition,
            "relay attempt completed"
        );

        match outcome.disposition.map_err(SubmitError::Relay)? {
            RelayDisposition::Accepted | RelayDisposition::Duplicate => {
                let (tx, rx) = oneshot::channel();
                self.open.add(hash, tx).await;
                // The accepted envelope will consume the declared sequence;
                // telling the queues now lets a follow-up submission for
                // this account release without waiting for the next
                // reconciliation pass.
                self.queues
                    .notify_account(&info.source_address, info.sequence)
                    .await;
                info!(tx_hash = %hash, "envelope accepted upstream; awaiting ledger outcome");
                tokio::select! {
                    _ = cancel.cancelled() => Err(SubmitError::Canceled),
                    result = rx => result.unwrap_or(Err(SubmitError::Canceled)),
                }
            }
            RelayDisposition::Rejected(RejectReason::BadSequence) => {
                // The transaction may have landed in a ledger moments before
                // the relay attempt; check the store once before giving up.
                warn!(
                    tx_hash = %hash,
                    "upstream node reports a stale sequence; re-checking the result store"
                );
                match self.results.transaction_by_hash(&hash).await {
                    Ok(Some(tx)) => Ok(tx),
                    Ok(None) => Err(SubmitError::BadSequence),
                    Err(err) => {
                        warn!(tx_hash = %hash, error = ?err, "result store re-check failed");
                        Err(SubmitError::BadSequence)
                    }
                }
            }
            RelayDisposition::Rejected(RejectReason::Other(code)) => {
                Err(SubmitError::RelayRejected(code))
            }
        }
    }

    /// One reconciliation pass, meant to be driven by an external scheduler
    /// on roughly the upstream ledger-close interval.
    ///
    /// Refreshes every account queue with pending work from a single batched
    /// sequence lookup, resolves open submissions that now have a recorded
    /// outcome, and sweeps the ones that have waited too long.
    #[instrument(skip_all)]
    pub async fn tick(&self) {
        let Ok(_guard) = self.tick_guard.try_lock() else {
            warn!("previous reconciliation pass still running; skipping this one");
            return;
        };

        let addresses = self.queues.addresses().await;
        if !addresses.is_empty() {
            match self.sequences.sequences_for(&addresses).await {
                Ok(sequences) => self.queues.notify_last_account_sequences(&sequences).await,
                Err(err) => warn!(error = ?err, "batched sequence refresh failed"),
            }
        }

        for hash in self.open.pending().await {
            match self.results.transaction_by_hash(&hash).await {
                Ok(Some(tx)) => {
                    info!(tx_hash = %hash, ledger = tx.ledger_sequence, "open submission confirmed");
                    self.open.finish(&hash, Ok(tx)).await;
                }
                Ok(None) => {}
                Err(err) => warn!(tx_hash = %hash, error = ?err, "result store poll failed"),
            }
        }

        let remaining = self.open.clean(self.open_timeout).await;
        self.metrics.open_submissions.set(remaining as i64);
        self.metrics
            .queued_submissions
            .set(self.queues.size().await as i64);
    }
}
