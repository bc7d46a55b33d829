//! End-to-end lifecycle scenarios against a file-backed document.

use std::fs;

use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use records_core::{PlayerId, PlayerRecord, RecordCollection, Timestamp};
use records_runtime::repository::codec;
use records_runtime::{
    FileRecordRepository, Lifecycle, LifecycleEvent, LifecyclePhase, RecordRepository,
    RuntimeError,
};
use tempfile::TempDir;

const DOCUMENT: &str = "PlayerRecords";

fn at(secs: i64) -> Timestamp {
    Utc.timestamp_opt(1_767_000_000 + secs, 0).unwrap()
}

fn open(dir: &TempDir) -> Lifecycle<FileRecordRepository> {
    Lifecycle::new(FileRecordRepository::new(dir.path(), DOCUMENT).unwrap())
}

fn read_back(dir: &TempDir) -> RecordCollection {
    let bytes = fs::read(dir.path().join("PlayerRecords.json")).unwrap();
    codec::decode(Some(&bytes)).unwrap()
}

#[test]
fn fresh_activation_without_document() {
    let dir = TempDir::new().unwrap();
    let mut lifecycle = open(&dir);

    assert_eq!(lifecycle.activate().unwrap(), 0);
    assert!(lifecycle.snapshot().unwrap().is_empty());
    assert!(!dir.path().join("PlayerRecords.json").exists());
}

#[test]
fn connect_die_disconnect_survives_restart() {
    let dir = TempDir::new().unwrap();
    let id = PlayerId(42);

    let mut lifecycle = open(&dir);
    lifecycle.activate().unwrap();
    lifecycle
        .handle(LifecycleEvent::PlayerConnected { player: id, at: at(1) })
        .unwrap();
    lifecycle
        .handle(LifecycleEvent::PlayerDied { player: id, at: at(2) })
        .unwrap();
    lifecycle
        .handle(LifecycleEvent::PlayerDisconnected {
            player: id,
            reason: "Disconnected".to_string(),
            at: at(3),
        })
        .unwrap();
    lifecycle.deactivate().unwrap();

    let mut restarted = open(&dir);
    assert_eq!(restarted.activate().unwrap(), 1);
    assert_eq!(
        restarted.snapshot().unwrap().get(id),
        Some(&PlayerRecord {
            last_connection: at(3),
            deaths: 1,
        })
    );
}

#[test]
fn death_without_connect_creates_record() {
    let dir = TempDir::new().unwrap();
    let mut lifecycle = open(&dir);
    lifecycle.activate().unwrap();

    lifecycle
        .handle(LifecycleEvent::PlayerDied {
            player: PlayerId(7),
            at: at(1),
        })
        .unwrap();

    assert_eq!(lifecycle.last_connection_time(PlayerId(7)), Some(at(1)));
    assert_eq!(lifecycle.death_count(PlayerId(7)), Some(1));
}

#[test]
fn corrupt_document_blocks_activation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("PlayerRecords.json");
    fs::write(&path, b"{\"players\": {\"42\": {\"deaths\": \"many\"").unwrap();

    let mut lifecycle = open(&dir);
    let err = lifecycle.activate().unwrap_err();

    assert!(matches!(err, RuntimeError::CorruptData { .. }));
    assert_eq!(lifecycle.phase(), LifecyclePhase::Uninitialized);
    assert!(lifecycle.snapshot().is_none());
    assert!(lifecycle.death_count(PlayerId(42)).is_none());

    // The corrupt document is left untouched for the operator.
    assert_eq!(
        fs::read(&path).unwrap(),
        b"{\"players\": {\"42\": {\"deaths\": \"many\""
    );
}

#[test]
fn world_reset_is_persisted_immediately() {
    let dir = TempDir::new().unwrap();
    let mut lifecycle = open(&dir);
    lifecycle.activate().unwrap();

    for id in [1, 2, 3] {
        lifecycle
            .handle(LifecycleEvent::PlayerConnected {
                player: PlayerId(id),
                at: at(id as i64),
            })
            .unwrap();
    }
    lifecycle.handle(LifecycleEvent::PeriodicCheckpoint).unwrap();
    assert_eq!(read_back(&dir).len(), 3);

    lifecycle
        .handle(LifecycleEvent::WorldReset {
            save_name: "wipe1".to_string(),
        })
        .unwrap();

    assert!(read_back(&dir).is_empty());
    assert!(lifecycle.snapshot().unwrap().is_empty());
}

#[test]
fn player_events_wait_for_checkpoint() {
    let dir = TempDir::new().unwrap();
    let mut lifecycle = open(&dir);
    lifecycle.activate().unwrap();
    lifecycle.handle(LifecycleEvent::PeriodicCheckpoint).unwrap();

    lifecycle
        .handle(LifecycleEvent::PlayerDied {
            player: PlayerId(5),
            at: at(1),
        })
        .unwrap();
    assert!(read_back(&dir).is_empty());
    assert!(lifecycle.is_dirty());

    lifecycle.handle(LifecycleEvent::PeriodicCheckpoint).unwrap();
    assert_eq!(read_back(&dir).get(PlayerId(5)).unwrap().deaths, 1);
    assert!(!lifecycle.is_dirty());
}

#[test]
fn failed_write_surfaces_and_keeps_records() {
    let dir = TempDir::new().unwrap();
    let mut lifecycle = open(&dir);
    lifecycle.activate().unwrap();
    lifecycle
        .handle(LifecycleEvent::PlayerConnected {
            player: PlayerId(9),
            at: at(1),
        })
        .unwrap();

    let blocker = dir.path().join("PlayerRecords.json.tmp");
    fs::create_dir(&blocker).unwrap();

    let err = lifecycle
        .handle(LifecycleEvent::PeriodicCheckpoint)
        .unwrap_err();
    assert!(err.is_retryable_write());
    assert_eq!(lifecycle.last_connection_time(PlayerId(9)), Some(at(1)));

    fs::remove_dir(&blocker).unwrap();
    lifecycle.deactivate().unwrap();
    assert_eq!(read_back(&dir).len(), 1);
}

#[test]
fn random_sessions_round_trip_through_disk() {
    let dir = TempDir::new().unwrap();
    let repo = FileRecordRepository::new(dir.path(), DOCUMENT).unwrap();
    let mut lifecycle = Lifecycle::new(repo);
    lifecycle.activate().unwrap();

    let mut rng = StdRng::seed_from_u64(42);
    let mut now = at(0);
    for _ in 0..500 {
        now += Duration::milliseconds(rng.gen_range(1..5_000));
        let player = PlayerId(rng.gen_range(76561198000000000..76561198000000020));
        let event = match rng.gen_range(0..10) {
            0..=3 => LifecycleEvent::PlayerConnected { player, at: now },
            4..=6 => LifecycleEvent::PlayerDisconnected {
                player,
                reason: "timeout".to_string(),
                at: now,
            },
            7 | 8 => LifecycleEvent::PlayerDied { player, at: now },
            _ => LifecycleEvent::PeriodicCheckpoint,
        };
        lifecycle.handle(event).unwrap();
    }

    let in_memory = lifecycle.snapshot().unwrap();
    lifecycle.deactivate().unwrap();

    assert_eq!(read_back(&dir), in_memory);

    let stored = lifecycle.repository().load().unwrap().unwrap();
    assert_eq!(codec::decode(Some(&stored)).unwrap(), in_memory);
}
