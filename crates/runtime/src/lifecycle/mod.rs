//! Lifecycle adapter between host events and the record store.
//!
//! [`Lifecycle`] owns the [`RecordStore`] for one activation and decides when
//! the collection is written:
//!
//! ```text
//! Uninitialized ──activate()──► Active ──deactivate()──► Terminated
//!                                 │
//!                                 ├─ connect / disconnect / death → memory only
//!                                 ├─ periodic checkpoint          → write
//!                                 └─ world reset                  → clear, write
//! ```
//!
//! Player events are batched in memory until the next checkpoint. A corrupt
//! document fails activation; the store is never silently replaced with an
//! empty one.

mod event;

pub use event::LifecycleEvent;

use std::fmt;

use records_core::{PlayerId, RecordCollection, RecordStore, Timestamp};
use tracing::{debug, error, info};

use crate::api::{PersistFailure, Result, RuntimeError};
use crate::repository::{RecordRepository, codec};

/// Externally visible phase of a [`Lifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Uninitialized,
    Active,
    Terminated,
}

impl LifecyclePhase {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Active => "active",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

enum State {
    Uninitialized,
    Active(RecordStore),
    Terminated,
}

/// Drives the record store through one plugin activation.
///
/// Events are applied through `&mut self`, one at a time. Wrap it in
/// [`crate::RecordsRuntime`] to share it across tasks.
pub struct Lifecycle<R> {
    repo: R,
    state: State,
}

impl<R: RecordRepository> Lifecycle<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            state: State::Uninitialized,
        }
    }

    pub fn phase(&self) -> LifecyclePhase {
        match self.state {
            State::Uninitialized => LifecyclePhase::Uninitialized,
            State::Active(_) => LifecyclePhase::Active,
            State::Terminated => LifecyclePhase::Terminated,
        }
    }

    /// True once the stored records are loaded and until deactivation.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Active(_))
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Loads the stored document and enters the active phase.
    ///
    /// Returns the number of player records loaded.
    pub fn activate(&mut self) -> Result<usize> {
        self.expect_phase("activate", LifecyclePhase::Uninitialized)?;

        let location = self.repo.describe();
        let bytes = self.repo.load().map_err(|e| {
            error!(
                target: "records::lifecycle",
                location = %location,
                error = %e,
                "Failed to read record document"
            );
            RuntimeError::PersistenceRead(e)
        })?;

        let records = codec::decode(bytes.as_deref()).map_err(|e| {
            error!(
                target: "records::lifecycle",
                location = %location,
                error = %e,
                "Record document is corrupt, refusing to activate"
            );
            RuntimeError::CorruptData {
                location: location.clone(),
                source: e,
            }
        })?;

        let loaded = records.len();
        self.state = State::Active(RecordStore::from_collection(records));

        info!(
            target: "records::lifecycle",
            location = %location,
            players = loaded,
            "Record store activated"
        );

        Ok(loaded)
    }

    /// Applies one host event.
    pub fn handle(&mut self, event: LifecycleEvent) -> Result<()> {
        let State::Active(store) = &mut self.state else {
            error!(
                target: "records::lifecycle",
                event = %event,
                phase = %self.phase(),
                "Lifecycle event outside the active phase"
            );
            return Err(RuntimeError::InvalidPhase {
                operation: event.name(),
                phase: self.phase(),
            });
        };

        match event {
            LifecycleEvent::PlayerConnected { player, at } => {
                let record = store.upsert_on_connect(player, at);
                debug!(target: "records::lifecycle", %player, deaths = record.deaths, "Player connected");
            }
            LifecycleEvent::PlayerDisconnected { player, reason, at } => {
                let record = store.upsert_on_disconnect(player, at);
                debug!(target: "records::lifecycle", %player, deaths = record.deaths, reason = %reason, "Player disconnected");
            }
            LifecycleEvent::PlayerDied { player, at } => {
                let record = store.record_death(player, at);
                debug!(target: "records::lifecycle", %player, deaths = record.deaths, "Player died");
            }
            LifecycleEvent::PeriodicCheckpoint => {
                debug!(
                    target: "records::lifecycle",
                    dirty = store.is_dirty(),
                    players = store.len(),
                    "Checkpoint requested"
                );
                persist(&self.repo, store)?;
            }
            LifecycleEvent::WorldReset { save_name } => {
                let discarded = store.len();
                store.reset();
                info!(
                    target: "records::lifecycle",
                    save = %save_name,
                    discarded,
                    "World reset, player records cleared"
                );
                persist(&self.repo, store)?;
            }
        }

        Ok(())
    }

    /// Writes the collection one last time and releases it.
    ///
    /// If the write fails the lifecycle stays active so the host may retry.
    pub fn deactivate(&mut self) -> Result<()> {
        let State::Active(store) = &mut self.state else {
            return Err(RuntimeError::InvalidPhase {
                operation: "deactivate",
                phase: self.phase(),
            });
        };

        persist(&self.repo, store)?;
        let players = store.len();
        self.state = State::Terminated;

        info!(target: "records::lifecycle", players, "Record store deactivated");
        Ok(())
    }

    pub fn last_connection_time(&self, player: PlayerId) -> Option<Timestamp> {
        self.store()?.last_connection_time(player)
    }

    pub fn death_count(&self, player: PlayerId) -> Option<u32> {
        self.store()?.death_count(player)
    }

    /// Copy of the current collection, or `None` outside the active phase.
    pub fn snapshot(&self) -> Option<RecordCollection> {
        self.store().map(RecordStore::snapshot)
    }

    /// True if player events are waiting for the next checkpoint.
    pub fn is_dirty(&self) -> bool {
        self.store().is_some_and(RecordStore::is_dirty)
    }

    fn store(&self) -> Option<&RecordStore> {
        match &self.state {
            State::Active(store) => Some(store),
            State::Uninitialized | State::Terminated => None,
        }
    }

    fn expect_phase(&self, operation: &'static str, expected: LifecyclePhase) -> Result<()> {
        let phase = self.phase();
        if phase == expected {
            Ok(())
        } else {
            Err(RuntimeError::InvalidPhase { operation, phase })
        }
    }
}

/// Encodes and writes the whole collection, clearing the dirty flag on success.
fn persist<R: RecordRepository>(repo: &R, store: &mut RecordStore) -> Result<()> {
    let write = || -> std::result::Result<usize, PersistFailure> {
        let bytes = codec::encode(store.collection())?;
        repo.save(&bytes)?;
        Ok(bytes.len())
    };

    match write() {
        Ok(bytes) => {
            store.mark_clean();
            debug!(target: "records::lifecycle", bytes, players = store.len(), "Record document written");
            Ok(())
        }
        Err(e) => {
            error!(
                target: "records::lifecycle",
                location = %repo.describe(),
                error = %e,
                "Failed to write record document"
            );
            Err(RuntimeError::PersistenceWrite(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use records_core::PlayerRecord;

    use super::*;
    use crate::repository::InMemoryRecordRepo;

    fn at(secs: i64) -> Timestamp {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn active() -> (Arc<InMemoryRecordRepo>, Lifecycle<Arc<InMemoryRecordRepo>>) {
        let repo = Arc::new(InMemoryRecordRepo::new());
        let mut lifecycle = Lifecycle::new(Arc::clone(&repo));
        lifecycle.activate().unwrap();
        (repo, lifecycle)
    }

    fn stored(repo: &InMemoryRecordRepo) -> RecordCollection {
        codec::decode(repo.load().unwrap().as_deref()).unwrap()
    }

    #[test]
    fn test_fresh_activation_is_empty() {
        let (repo, lifecycle) = active();

        assert!(lifecycle.is_ready());
        assert_eq!(lifecycle.phase(), LifecyclePhase::Active);
        assert!(lifecycle.snapshot().unwrap().is_empty());
        assert_eq!(repo.save_count(), 0);
    }

    #[test]
    fn test_activation_loads_existing_records() {
        let records: RecordCollection = [(PlayerId(3), PlayerRecord::died(at(0)))]
            .into_iter()
            .collect();
        let repo = InMemoryRecordRepo::with_document(codec::encode(&records).unwrap());
        let mut lifecycle = Lifecycle::new(repo);

        assert_eq!(lifecycle.activate().unwrap(), 1);
        assert_eq!(lifecycle.death_count(PlayerId(3)), Some(1));
        assert!(!lifecycle.is_dirty());
    }

    #[test]
    fn test_corrupt_document_fails_activation() {
        let mut lifecycle = Lifecycle::new(InMemoryRecordRepo::with_document("{\"players\":"));

        let err = lifecycle.activate().unwrap_err();
        assert!(matches!(err, RuntimeError::CorruptData { .. }));
        assert_eq!(lifecycle.phase(), LifecyclePhase::Uninitialized);
        assert!(lifecycle.snapshot().is_none());
        assert!(!lifecycle.is_ready());
    }

    #[test]
    fn test_activate_twice_is_rejected() {
        let (_repo, mut lifecycle) = active();
        let err = lifecycle.activate().unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::InvalidPhase {
                phase: LifecyclePhase::Active,
                ..
            }
        ));
    }

    #[test]
    fn test_player_events_do_not_write() {
        let (repo, mut lifecycle) = active();

        lifecycle
            .handle(LifecycleEvent::PlayerConnected {
                player: PlayerId(42),
                at: at(1),
            })
            .unwrap();
        lifecycle
            .handle(LifecycleEvent::PlayerDied {
                player: PlayerId(42),
                at: at(2),
            })
            .unwrap();
        lifecycle
            .handle(LifecycleEvent::PlayerDisconnected {
                player: PlayerId(42),
                reason: "Disconnected".to_string(),
                at: at(3),
            })
            .unwrap();

        assert_eq!(repo.save_count(), 0);
        assert!(lifecycle.is_dirty());
        assert_eq!(lifecycle.last_connection_time(PlayerId(42)), Some(at(3)));
        assert_eq!(lifecycle.death_count(PlayerId(42)), Some(1));
    }

    #[test]
    fn test_checkpoint_writes_full_collection() {
        let (repo, mut lifecycle) = active();
        lifecycle
            .handle(LifecycleEvent::PlayerDied {
                player: PlayerId(7),
                at: at(1),
            })
            .unwrap();

        lifecycle.handle(LifecycleEvent::PeriodicCheckpoint).unwrap();

        assert_eq!(repo.save_count(), 1);
        assert!(!lifecycle.is_dirty());
        assert_eq!(stored(&repo), lifecycle.snapshot().unwrap());
    }

    #[test]
    fn test_world_reset_persists_empty_collection() {
        let (repo, mut lifecycle) = active();
        for id in 1..=3 {
            lifecycle
                .handle(LifecycleEvent::PlayerConnected {
                    player: PlayerId(id),
                    at: at(id as i64),
                })
                .unwrap();
        }
        lifecycle.handle(LifecycleEvent::PeriodicCheckpoint).unwrap();
        assert_eq!(stored(&repo).len(), 3);

        lifecycle.handle(LifecycleEvent::world_reset("wipe1")).unwrap();

        assert!(lifecycle.snapshot().unwrap().is_empty());
        assert!(stored(&repo).is_empty());
        for id in 1..=3 {
            assert!(lifecycle.death_count(PlayerId(id)).is_none());
        }
    }

    #[test]
    fn test_failed_checkpoint_keeps_memory_and_retries() {
        let (repo, mut lifecycle) = active();
        lifecycle
            .handle(LifecycleEvent::PlayerConnected {
                player: PlayerId(1),
                at: at(1),
            })
            .unwrap();

        repo.set_read_only(true);
        let err = lifecycle
            .handle(LifecycleEvent::PeriodicCheckpoint)
            .unwrap_err();
        assert!(matches!(err, RuntimeError::PersistenceWrite(_)));
        assert!(lifecycle.is_dirty());
        assert_eq!(lifecycle.last_connection_time(PlayerId(1)), Some(at(1)));

        repo.set_read_only(false);
        lifecycle.handle(LifecycleEvent::PeriodicCheckpoint).unwrap();
        assert!(!lifecycle.is_dirty());
        assert_eq!(stored(&repo).len(), 1);
    }

    #[test]
    fn test_deactivate_writes_and_releases() {
        let (repo, mut lifecycle) = active();
        lifecycle
            .handle(LifecycleEvent::PlayerDied {
                player: PlayerId(9),
                at: at(1),
            })
            .unwrap();

        lifecycle.deactivate().unwrap();

        assert_eq!(lifecycle.phase(), LifecyclePhase::Terminated);
        assert!(!lifecycle.is_ready());
        assert!(lifecycle.death_count(PlayerId(9)).is_none());
        assert_eq!(stored(&repo).get(PlayerId(9)).unwrap().deaths, 1);
    }

    #[test]
    fn test_failed_deactivate_stays_active() {
        let (repo, mut lifecycle) = active();
        repo.set_read_only(true);

        assert!(matches!(
            lifecycle.deactivate(),
            Err(RuntimeError::PersistenceWrite(_))
        ));
        assert!(lifecycle.is_ready());

        repo.set_read_only(false);
        lifecycle.deactivate().unwrap();
        assert_eq!(lifecycle.phase(), LifecyclePhase::Terminated);
    }

    #[test]
    fn test_events_outside_active_phase_are_rejected() {
        let mut lifecycle = Lifecycle::new(InMemoryRecordRepo::new());
        let err = lifecycle
            .handle(LifecycleEvent::PeriodicCheckpoint)
            .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::InvalidPhase {
                phase: LifecyclePhase::Uninitialized,
                ..
            }
        ));

        lifecycle.activate().unwrap();
        lifecycle.deactivate().unwrap();

        assert!(lifecycle.handle(LifecycleEvent::died(PlayerId(1))).is_err());
        assert!(lifecycle.deactivate().is_err());
        assert!(lifecycle.activate().is_err());
    }
}
