use std::time::{Duration, Instant};

use tokio::sync::{oneshot, Mutex};
use tracing::{debug, warn};

use crate::error::SubmitError;

/// Conduit a queued submission waits on. It receives exactly one value:
/// `Ok(())` when the account's committed sequence enters the entry's window,
/// or the error that terminates the submission instead.
pub(crate) type ReleaseReceiver = oneshot::Receiver<Result<(), SubmitError>>;
type ReleaseSender = oneshot::Sender<Result<(), SubmitError>>;

/// One submission waiting for its account's committed sequence to land in
/// `[min_seq, max_seq]`.
struct QueuedSubmission {
    min_seq: u64,
    max_seq: u64,
    release: ReleaseSender,
}

struct QueueInner {
    /// Kept unordered and classified on every notification. Per-account
    /// depth is expected to stay shallow, so a linear scan beats maintaining
    /// a heap.
    entries: Vec<QueuedSubmission>,
    /// Highest committed sequence this queue has been told about.
    last_seen: u64,
    /// Last time an entry left the queue.
    last_active: Instant,
}

impl QueueInner {
    /// Remove every entry the current `last_seen` sequence resolves: entries
    /// whose window has closed (permanently invalid) and entries whose
    /// window is open, the latter sorted so the entry requiring the smallest
    /// sequence advance is released first.
    fn take_actionable(&mut self) -> (Vec<QueuedSubmission>, Vec<QueuedSubmission>) {
        let mut invalid = Vec::new();
        let mut ready = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            let entry = &self.entries[i];
            if entry.max_seq < self.last_seen {
                invalid.push(self.entries.swap_remove(i));
            } else if entry.min_seq <= self.last_seen && self.last_seen <= entry.max_seq {
                ready.push(self.entries.swap_remove(i));
            } else {
                i += 1;
            }
        }
        ready.sort_by_key(|e| e.max_seq);
        (invalid, ready)
    }
}

/// Pending submissions for a single account.
///
/// Entries are tagged with the sequence window in which they become valid
/// and are released, failed, or kept on each committed-sequence
/// notification. A queue that goes too long without releasing anything while
/// non-empty fails every remaining entry, bounding memory for stuck or
/// abandoned accounts.
pub(crate) struct AccountQueue {
    inner: Mutex<QueueInner>,
    idle_timeout: Duration,
}

impl AccountQueue {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                entries: Vec::new(),
                last_seen: 0,
                last_active: Instant::now(),
            }),
            idle_timeout,
        }
    }

    /// Queue a submission declaring `sequence`, optionally with an explicit
    /// window minimum. The entry becomes valid once the committed sequence
    /// reaches `min_seq_num.unwrap_or(sequence - 1) ..= sequence - 1`.
    pub async fn push(&self, sequence: u64, min_seq_num: Option<u64>) -> ReleaseReceiver {
        let (tx, rx) = oneshot::channel();
        let max_seq = sequence.saturating_sub(1);
        let min_seq = min_seq_num.unwrap_or(max_seq).min(max_seq);
        let mut inner = self.inner.lock().await;
        inner.entries.push(QueuedSubmission {
            min_seq,
            max_seq,
            release: tx,
        });
        rx
    }

    /// Tell the queue the account's current committed sequence.
    ///
    /// `last_seen` only ever moves forward, but classification runs on every
    /// call: a repeated or lower notification can still release entries
    /// pushed since the last one (e.g. a concurrent duplicate submission).
    pub async fn notify_last_account_sequence(&self, sequence: u64) {
        let mut inner = self.inner.lock().await;
        if sequence > inner.last_seen {
            inner.last_seen = sequence;
        }

        let (invalid, ready) = inner.take_actionable();
        let removed = !invalid.is_empty() || !ready.is_empty();
        for entry in invalid {
            debug!(
                max_seq = entry.max_seq,
                last_seen = inner.last_seen,
                "failing queued submission whose sequence window has closed"
            );
            let _ = entry.release.send(Err(SubmitError::BadSequence));
        }
        for entry in ready {
            let _ = entry.release.send(Ok(()));
        }

        if removed {
            inner.last_active = Instant::now();
        } else if !inner.entries.is_empty() && inner.last_active.elapsed() > self.idle_timeout {
            warn!(
                pending = inner.entries.len(),
                "account queue idle past timeout; failing all pending submissions"
            );
            for entry in inner.entries.drain(..) {
                let _ = entry.release.send(Err(SubmitError::BadSequence));
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.entries.is_empty()
    }
}
