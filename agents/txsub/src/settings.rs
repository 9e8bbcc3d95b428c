use std::time::Duration;

use serde::Deserialize;

/// Tunables for the submission coordinator. All fields default sensibly, so
/// an embedding gateway only overrides what it must.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TxSubSettings {
    /// How long a non-empty account queue may go without releasing an entry
    /// before its remaining entries are failed, in seconds.
    pub queue_idle_timeout_secs: u64,
    /// Capacity bound on queued submissions across all accounts.
    pub max_queued_submissions: usize,
    /// How long an accepted submission may wait for a ledger outcome before
    /// its callers are told it timed out, in seconds.
    pub open_submission_timeout_secs: u64,
}

impl Default for TxSubSettings {
    fn default() -> Self {
        Self {
            queue_idle_timeout_secs: 10,
            max_queued_submissions: 1024,
            open_submission_timeout_secs: 30,
        }
    }
}

impl TxSubSettings {
    pub(crate) fn queue_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.queue_idle_timeout_secs)
    }

    pub(crate) fn open_submission_timeout(&self) -> Duration {
        Duration::from_secs(self.open_submission_timeout_secs)
    }
}
