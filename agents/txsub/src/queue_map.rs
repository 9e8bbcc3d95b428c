use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, Mutex};
use tracing::{debug, trace};

use gateway_core::Address;

use crate::error::SubmitError;
use crate::queue::{AccountQueue, ReleaseReceiver};

/// Routes per-account queue traffic: owns one [`AccountQueue`] per account
/// with pending work, creating queues lazily on first push and dropping them
/// once empty, so memory is bounded by the set of active accounts. A global
/// capacity bound across all accounts is enforced at push time.
pub(crate) struct SubmissionQueues {
    queues: Mutex<HashMap<Address, Arc<AccountQueue>>>,
    queue_idle_timeout: Duration,
    max_queued: usize,
}

impl SubmissionQueues {
    pub fn new(queue_idle_timeout: Duration, max_queued: usize) -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
            queue_idle_timeout,
            max_queued,
        }
    }

    /// Queue a submission for `account`. When the coordinator is already
    /// holding its maximum number of entries the returned conduit is
    /// pre-populated with a capacity error and no state is created.
    pub async fn push(
        &self,
        account: &Address,
        sequence: u64,
        min_seq_num: Option<u64>,
    ) -> ReleaseReceiver {
        let mut queues = self.queues.lock().await;

        let mut total = 0;
        for queue in queues.values() {
            total += queue.len().await;
        }
        if total >= self.max_queued {
            debug!(%account, total, "submission queues at capacity; refusing push");
            let (tx, rx) = oneshot::channel();
            let _ = tx.send(Err(SubmitError::QueueFull));
            return rx;
        }

        let queue = queues
            .entry(account.clone())
            .or_insert_with(|| Arc::new(AccountQueue::new(self.queue_idle_timeout)))
            .clone();
        // Pushed while the map lock is held so a concurrent prune cannot
        // orphan the new entry.
        queue.push(sequence, min_seq_num).await
    }

    /// Fan a batch of committed-sequence notifications out to the matching
    /// account queues, then drop any queue that ended up empty.
    pub async fn notify_last_account_sequences(&self, sequences: &HashMap<Address, u64>) {
        let mut queues = self.queues.lock().await;
        for (account, queue) in queues.iter() {
            if let Some(sequence) = sequences.get(account) {
                trace!(%account, sequence, "refreshing account queue");
                queue.notify_last_account_sequence(*sequence).await;
            }
        }

        let mut emptied = Vec::new();
        for (account, queue) in queues.iter() {
            if queue.is_empty().await {
                emptied.push(account.clone());
            }
        }
        for account in emptied {
            queues.remove(&account);
        }
    }

    /// Single-account form of [`Self::notify_last_account_sequences`].
    pub async fn notify_account(&self, account: &Address, sequence: u64) {
        let sequences = HashMap::from([(account.clone(), sequence)]);
        self.notify_last_account_sequences(&sequences).await;
    }

    /// Total queued entries across all accounts.
    pub async fn size(&self) -> usize {
        let queues = self.queues.lock().await;
        let mut total = 0;
        for queue in queues.values() {
            total += queue.len().await;
        }
        total
    }

    /// Every account that currently has pending work.
    pub async fn addresses(&self) -> Vec<Address> {
        self.queues.lock().await.keys().cloned().collect()
    }
}
