use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::{oneshot, Mutex};
use tracing::{debug, warn};

use gateway_core::TxHash;

use crate::error::{SubmissionResult, SubmitError};

/// Conduit a caller drains for its terminal answer. Single-use and owned by
/// exactly one caller; the tracker delivers exactly one value to it.
pub(crate) type ResultSender = oneshot::Sender<SubmissionResult>;

struct OpenSubmission {
    submitted_at: Instant,
    listeners: Vec<ResultSender>,
}

/// Transaction hashes accepted by the upstream node whose ledger outcome is
/// not yet known, with every caller waiting on each.
///
/// A hash is tracked from first relay acceptance until it is finished with a
/// terminal result or swept by age; either way every registered listener
/// hears the answer exactly once. Several listeners may wait on one hash,
/// which is how concurrent submissions of identical content converge on a
/// single relay slot.
pub(crate) struct OpenSubmissionTracker {
    inner: Mutex<HashMap<TxHash, OpenSubmission>>,
}

impl OpenSubmissionTracker {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Register a listener for `hash`, opening the submission if this is the
    /// first listener.
    pub async fn add(&self, hash: TxHash, listener: ResultSender) {
        let mut inner = self.inner.lock().await;
        inner
            .entry(hash)
            .or_insert_with(|| OpenSubmission {
                submitted_at: Instant::now(),
                listeners: Vec::new(),
            })
            .listeners
            .push(listener);
    }

    /// Deliver `result` to every listener registered for `hash` and forget
    /// the hash. Finishing a hash that is not open is a no-op: the result
    /// may simply have been found before anyone asked again.
    pub async fn finish(&self, hash: &TxHash, result: SubmissionResult) {
        let mut inner = self.inner.lock().await;
        if let Some(open) = inner.remove(hash) {
            debug!(tx_hash = %hash, listeners = open.listeners.len(), "finishing open submission");
            Self::deliver(open, result);
        }
    }

    /// Sweep submissions that have been open longer than `max_age`, telling
    /// their listeners the wait timed out. Returns how many remain open.
    pub async fn clean(&self, max_age: Duration) -> usize {
        let mut inner = self.inner.lock().await;
        let now = Instant::now();
        let expired: Vec<TxHash> = inner
            .iter()
            .filter(|(_, open)| now.duration_since(open.submitted_at) > max_age)
            .map(|(hash, _)| *hash)
            .collect();
        for hash in expired {
            if let Some(open) = inner.remove(&hash) {
                warn!(tx_hash = %hash, "open submission timed out before a ledger outcome appeared");
                Self::deliver(open, Err(SubmitError::Timeout));
            }
        }
        inner.len()
    }

    /// Every hash currently awaiting a ledger outcome.
    pub async fn pending(&self) -> Vec<TxHash> {
        self.inner.lock().await.keys().copied().collect()
    }

    fn deliver(open: OpenSubmission, result: SubmissionResult) {
        for listener in open.listeners {
            // A caller that stopped waiting has dropped its receiver; that
            // is its business, not an error here.
            let _ = listener.send(result.clone());
        }
    }
}
