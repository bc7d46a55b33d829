//! Runtime for the per-player record store.
//!
//! This crate wires the pure [`records_core::RecordStore`] to durable storage
//! and to the host's lifecycle events. Hosts embed [`Lifecycle`] directly
//! when they already serialize events, or start a [`RecordsRuntime`] and
//! talk to it through cloneable [`RecordsHandle`]s.
//!
//! Modules are organized by responsibility:
//! - [`lifecycle`] hosts the activation state machine and event handling
//! - [`repository`] provides the document codec and storage backends
//! - [`api`] exposes the types hosts interact with
//! - [`runtime`] spawns the worker that owns the lifecycle
//! - [`config`] loads runtime settings from the environment
pub mod api;
pub mod config;
pub mod lifecycle;
pub mod repository;
pub mod runtime;

mod workers;

pub use api::{PersistFailure, RecordsHandle, Result, RuntimeError};
pub use config::RecordsConfig;
pub use lifecycle::{Lifecycle, LifecycleEvent, LifecyclePhase};
pub use repository::{
    CodecError, FileRecordRepository, InMemoryRecordRepo, RecordRepository, RepositoryError,
};
pub use runtime::RecordsRuntime;
