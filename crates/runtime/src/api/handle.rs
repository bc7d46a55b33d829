//! Cloneable façade for issuing commands to the record worker.
//!
//! [`RecordsHandle`] hides channel plumbing and offers async helpers for
//! raising lifecycle events and answering read-only queries.
use tokio::sync::{mpsc, oneshot};

use records_core::{PlayerId, RecordCollection, Timestamp};

use super::errors::{Result, RuntimeError};
use crate::lifecycle::LifecycleEvent;
use crate::workers::Command;

/// Host-facing handle to the record store
#[derive(Clone)]
pub struct RecordsHandle {
    command_tx: mpsc::Sender<Command>,
}

impl RecordsHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>) -> Self {
        Self { command_tx }
    }

    /// Apply a lifecycle event and wait until it has been handled.
    ///
    /// Checkpoint and reset events return once the document is written.
    pub async fn dispatch(&self, event: LifecycleEvent) -> Result<()> {
        self.request(|reply| Command::Dispatch { event, reply })
            .await?
    }

    pub async fn player_connected(&self, player: PlayerId) -> Result<()> {
        self.dispatch(LifecycleEvent::connected(player)).await
    }

    pub async fn player_disconnected(&self, player: PlayerId, reason: &str) -> Result<()> {
        self.dispatch(LifecycleEvent::disconnected(player, reason))
            .await
    }

    pub async fn player_died(&self, player: PlayerId) -> Result<()> {
        self.dispatch(LifecycleEvent::died(player)).await
    }

    /// Write the current collection now.
    pub async fn checkpoint(&self) -> Result<()> {
        self.dispatch(LifecycleEvent::PeriodicCheckpoint).await
    }

    /// Clear every record and write the empty collection.
    pub async fn world_reset(&self, save_name: &str) -> Result<()> {
        self.dispatch(LifecycleEvent::world_reset(save_name)).await
    }

    /// Last connect or disconnect time, `None` for unknown players.
    pub async fn last_connection_time(&self, player: PlayerId) -> Result<Option<Timestamp>> {
        self.request(|reply| Command::LastConnection { player, reply })
            .await
    }

    /// Death count, `None` for unknown players.
    pub async fn death_count(&self, player: PlayerId) -> Result<Option<u32>> {
        self.request(|reply| Command::DeathCount { player, reply })
            .await
    }

    /// Query the whole collection (read-only copy)
    pub async fn snapshot(&self) -> Result<Option<RecordCollection>> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// True while the store is active. A stopped worker reports `false`.
    pub async fn is_ready(&self) -> Result<bool> {
        match self.request(|reply| Command::IsReady { reply }).await {
            Err(RuntimeError::CommandChannelClosed) => Ok(false),
            result => result,
        }
    }

    /// Deactivate the store: final write, then the worker stops.
    ///
    /// On a failed write the worker stays up and this may be called again.
    pub async fn shutdown(&self) -> Result<()> {
        self.request(|reply| Command::Shutdown { reply }).await?
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }
}
