use eyre::Result;
use prometheus::{
    histogram_opts, opts, register_histogram_with_registry,
    register_int_counter_vec_with_registry, register_int_gauge_with_registry, Histogram,
    IntCounterVec, IntGauge, Registry,
};

use crate::error::SubmissionResult;

/// The metrics namespace prefix. All metric names start with `{NAMESPACE}_`.
const NAMESPACE: &str = "gateway";

macro_rules! namespaced {
    ($name:expr) => {
        format!("{}_{}", NAMESPACE, $name)
    };
}

/// Read-only observability surface of the submission coordinator. Registered
/// against an injected registry so independent coordinator instances can
/// coexist (and be asserted on) in tests.
#[derive(Clone, Debug)]
pub struct SubmissionMetrics {
    /// Wall time of individual relay attempts to the upstream node.
    pub relay_duration: Histogram,
    /// Submissions accepted upstream whose ledger outcome is still unknown.
    pub open_submissions: IntGauge,
    /// Entries currently waiting in per-account queues.
    pub queued_submissions: IntGauge,
    /// Terminal answers handed to submit callers, labeled by outcome.
    pub submissions_total: IntCounterVec,
}

impl SubmissionMetrics {
    /// Register the coordinator's metrics with `registry`.
    pub fn new(registry: &Registry) -> Result<Self> {
        let relay_duration = register_histogram_with_registry!(
            histogram_opts!(
                namespaced!("relay_duration_seconds"),
                "Wall time of individual relay attempts to the upstream consensus node",
                prometheus::exponential_buckets(0.05, 2.0, 10)?
            ),
            registry
        )?;

        let open_submissions = register_int_gauge_with_registry!(
            opts!(
                namespaced!("open_submissions"),
                "Submissions accepted upstream that do not yet have a ledger outcome"
            ),
            registry
        )?;

        let queued_submissions = register_int_gauge_with_registry!(
            opts!(
                namespaced!("queued_submissions"),
                "Submissions waiting in per-account sequence queues"
            ),
            registry
        )?;

        let submissions_total = register_int_counter_vec_with_registry!(
            opts!(
                namespaced!("submissions_total"),
                "Terminal answers delivered to submit callers, by outcome"
            ),
            &["outcome"],
            registry
        )?;

        Ok(Self {
            relay_duration,
            open_submissions,
            queued_submissions,
            submissions_total,
        })
    }

    pub(crate) fn observe_submission(&self, result: &SubmissionResult) {
        let outcome = match result {
            Ok(tx) if tx.successful => "confirmed",
            Ok(_) => "confirmed_failed",
            Err(err) => err.metric_label(),
        };
        self.submissions_total.with_label_values(&[outcome]).inc();
    }
}
