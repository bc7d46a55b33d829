//! High-level runtime orchestrator.
//!
//! The runtime activates the record store, moves the [`Lifecycle`] into a
//! background worker, and hands out [`RecordsHandle`]s so any number of host
//! tasks can raise events without sharing mutable state.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::{RecordsHandle, Result, RuntimeError};
use crate::config::RecordsConfig;
use crate::lifecycle::Lifecycle;
use crate::repository::{FileRecordRepository, RecordRepository};
use crate::workers::RecordsWorker;

/// Running record store: a worker task plus the handle that feeds it.
pub struct RecordsRuntime {
    handle: RecordsHandle,
    worker_handle: Option<JoinHandle<()>>,
}

impl RecordsRuntime {
    /// Activate the store on `repo` and spawn its worker.
    ///
    /// Activation happens before the worker starts, so a corrupt document is
    /// reported here and no worker is left running. Must be called from
    /// within a Tokio runtime.
    pub fn start<R>(config: &RecordsConfig, repo: R) -> Result<Self>
    where
        R: RecordRepository + 'static,
    {
        let mut lifecycle = Lifecycle::new(repo);
        lifecycle.activate()?;

        let (command_tx, command_rx) = mpsc::channel(config.command_buffer.max(1));
        let worker = RecordsWorker::new(lifecycle, command_rx, config.autosave_interval);
        let worker_handle = tokio::spawn(worker.run());

        Ok(Self {
            handle: RecordsHandle::new(command_tx),
            worker_handle: Some(worker_handle),
        })
    }

    /// Open the file-backed document named by `config` and start on it.
    pub fn open(config: &RecordsConfig) -> Result<Self> {
        let repo = FileRecordRepository::new(&config.data_dir, &config.document_name)?;
        Self::start(config, repo)
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RecordsHandle {
        self.handle.clone()
    }

    /// Deactivate the store and wait for the worker to exit.
    ///
    /// If the final write fails the worker keeps the records and this may be
    /// called again. Once it has succeeded, further calls return `Ok(())`.
    pub async fn shutdown(&mut self) -> Result<()> {
        let Some(worker_handle) = self.worker_handle.as_mut() else {
            return Ok(());
        };

        self.handle.shutdown().await?;
        let joined = worker_handle.await.map_err(RuntimeError::WorkerJoin);
        self.worker_handle = None;
        joined
    }
}
