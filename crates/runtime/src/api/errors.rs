//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from the codec, repositories, and worker coordination so
//! hosts can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use crate::lifecycle::LifecyclePhase;
pub use crate::repository::{CodecError, RepositoryError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("record document at {location} is corrupt")]
    CorruptData {
        location: String,
        #[source]
        source: CodecError,
    },

    #[error("failed to read record document")]
    PersistenceRead(#[source] RepositoryError),

    #[error("failed to write record document")]
    PersistenceWrite(#[source] PersistFailure),

    #[error("{operation} is not allowed while the record store is {phase}")]
    InvalidPhase {
        operation: &'static str,
        phase: LifecyclePhase,
    },

    #[error("record worker command channel closed")]
    CommandChannelClosed,

    #[error("record worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("record worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl RuntimeError {
    /// True for failures that leave in-memory records intact and can be
    /// retried by a later checkpoint.
    pub fn is_retryable_write(&self) -> bool {
        matches!(self, Self::PersistenceWrite(_))
    }
}

/// Reason a durable write did not complete.
#[derive(Debug, Error)]
pub enum PersistFailure {
    #[error(transparent)]
    Encode(#[from] CodecError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
