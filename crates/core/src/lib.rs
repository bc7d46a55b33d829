//! Per-player record model shared by the runtime and offline tools.
//!
//! `records-core` defines the canonical record types and the in-memory
//! [`RecordStore`] that applies lifecycle mutations. It performs no I/O:
//! persistence and event dispatch live in `records-runtime`, which depends on
//! the types re-exported here.
pub mod record;
pub mod store;
pub mod types;

pub use record::{PlayerRecord, RecordCollection};
pub use store::RecordStore;
pub use types::{PlayerId, Timestamp};
