//! Worker tasks that back the runtime orchestration.
//!
//! The record worker owns the [`crate::Lifecycle`] and applies commands from
//! every [`crate::RecordsHandle`] one at a time.

mod records;

pub use records::{Command, RecordsWorker};
