//! Transaction-submission coordinator for the ledger gateway.
//!
//! Sits between the gateway's request handlers and a single upstream
//! consensus node. Every submitted envelope gets exactly one terminal
//! answer: the ledger-confirmed transaction, or the reason no confirmation
//! will come. Along the way the coordinator deduplicates resubmissions
//! against the result store, holds each envelope until its account's
//! committed sequence makes it valid, relays it at most once per caller,
//! and fans a single ledger outcome out to every caller waiting on the
//! same transaction hash.
//!
//! The embedding gateway drives [`SubmissionSystem::submit`] from its
//! request handlers and [`SubmissionSystem::tick`] from a scheduler running
//! at roughly the upstream ledger-close interval. All state is in memory
//! and is rebuilt from new submissions after a restart.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod metrics;
mod open_tracker;
mod queue;
mod queue_map;
mod settings;
mod system;

pub use error::{SubmissionResult, SubmitError};
pub use metrics::SubmissionMetrics;
pub use settings::TxSubSettings;
pub use system::SubmissionSystem;
