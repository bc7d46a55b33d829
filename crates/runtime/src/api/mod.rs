//! Public runtime API surface.
//!
//! This module gathers the types exposed to hosts so the lifecycle and worker
//! layers can stay focused on orchestration.

pub mod errors;
pub mod handle;

pub use errors::{PersistFailure, Result, RuntimeError};
pub use handle::RecordsHandle;
