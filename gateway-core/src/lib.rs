//! Shared vocabulary for the ledger gateway: the domain types exchanged with
//! the upstream consensus node, the traits its backing services implement,
//! and the error type those services return.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod traits;
mod types;

pub use error::*;
pub use traits::*;
pub use types::*;
