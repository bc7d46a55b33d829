//! Record worker that owns the authoritative [`Lifecycle`].
//!
//! Receives commands from [`crate::RecordsHandle`], applies them in arrival
//! order, and optionally raises its own checkpoints on a fixed period.

use std::time::Duration;

use records_core::{PlayerId, RecordCollection, Timestamp};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::api::Result;
use crate::lifecycle::{Lifecycle, LifecycleEvent};
use crate::repository::RecordRepository;

/// Commands that can be sent to the record worker
pub enum Command {
    /// Apply a lifecycle event.
    Dispatch {
        event: LifecycleEvent,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Last connect or disconnect time of a player.
    LastConnection {
        player: PlayerId,
        reply: oneshot::Sender<Option<Timestamp>>,
    },
    /// Death count of a player.
    DeathCount {
        player: PlayerId,
        reply: oneshot::Sender<Option<u32>>,
    },
    /// Copy of the whole collection (read-only).
    Snapshot {
        reply: oneshot::Sender<Option<RecordCollection>>,
    },
    /// Whether the store is active.
    IsReady { reply: oneshot::Sender<bool> },
    /// Deactivate and stop the worker. The worker keeps running if the final
    /// write fails so the caller can retry.
    Shutdown { reply: oneshot::Sender<Result<()>> },
}

/// Background task that serializes access to the record store.
pub struct RecordsWorker<R> {
    lifecycle: Lifecycle<R>,
    command_rx: mpsc::Receiver<Command>,
    autosave: Option<Duration>,
    /// Set once a `Shutdown` command failed to write. The worker then leaves
    /// every further write to an explicit caller request.
    shutdown_failed: bool,
}

impl<R: RecordRepository> RecordsWorker<R> {
    /// Creates a worker around an already activated lifecycle.
    pub fn new(
        lifecycle: Lifecycle<R>,
        command_rx: mpsc::Receiver<Command>,
        autosave: Option<Duration>,
    ) -> Self {
        Self {
            lifecycle,
            command_rx,
            autosave,
            shutdown_failed: false,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        let mut autosave = self.autosave.map(|period| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => {
                        if self.handle_command(cmd) {
                            break;
                        }
                    }
                    None => {
                        self.deactivate_on_close();
                        break;
                    }
                },
                _ = next_tick(&mut autosave) => {
                    self.autosave_checkpoint();
                }
            }
        }

        debug!(target: "records::worker", "Record worker stopped");
    }

    /// Applies one command. Returns true once the worker should stop.
    fn handle_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Dispatch { event, reply } => {
                let _ = reply.send(self.lifecycle.handle(event));
            }
            Command::LastConnection { player, reply } => {
                let _ = reply.send(self.lifecycle.last_connection_time(player));
            }
            Command::DeathCount { player, reply } => {
                let _ = reply.send(self.lifecycle.death_count(player));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.lifecycle.snapshot());
            }
            Command::IsReady { reply } => {
                let _ = reply.send(self.lifecycle.is_ready());
            }
            Command::Shutdown { reply } => {
                let result = self.lifecycle.deactivate();
                let stopped = result.is_ok();
                self.shutdown_failed = !stopped;
                let _ = reply.send(result);
                return stopped;
            }
        }
        false
    }

    fn autosave_checkpoint(&mut self) {
        if !self.lifecycle.is_ready() || self.shutdown_failed {
            return;
        }

        if let Err(e) = self.lifecycle.handle(LifecycleEvent::PeriodicCheckpoint) {
            warn!(target: "records::worker", error = %e, "Autosave checkpoint failed");
        }
    }

    fn deactivate_on_close(&mut self) {
        if !self.lifecycle.is_ready() {
            return;
        }

        if self.shutdown_failed {
            error!(
                target: "records::worker",
                dirty = self.lifecycle.is_dirty(),
                "All handles dropped after a failed shutdown, player records were not written"
            );
            return;
        }

        info!(target: "records::worker", "All handles dropped, deactivating record store");
        if let Err(e) = self.lifecycle.deactivate() {
            error!(
                target: "records::worker",
                error = %e,
                "Final write failed, unsaved player records are lost"
            );
        }
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
