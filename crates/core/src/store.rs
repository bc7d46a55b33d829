//! In-memory record store.
//!
//! [`RecordStore`] owns the [`RecordCollection`] for one activation and applies
//! the create-or-update rules for each lifecycle mutation. Every mutation marks
//! the store dirty; the persistence layer clears the flag once the collection
//! has been written.

use crate::record::{PlayerRecord, RecordCollection};
use crate::types::{PlayerId, Timestamp};

/// Keyed collection of player records with a dirty-on-write flag.
#[derive(Clone, Debug, Default)]
pub struct RecordStore {
    records: RecordCollection,
    dirty: bool,
}

impl RecordStore {
    /// Creates an empty, clean store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a collection loaded from durable storage. The store starts clean.
    pub fn from_collection(records: RecordCollection) -> Self {
        Self {
            records,
            dirty: false,
        }
    }

    pub fn get(&self, id: PlayerId) -> Option<&PlayerRecord> {
        self.records.get(id)
    }

    pub fn last_connection_time(&self, id: PlayerId) -> Option<Timestamp> {
        self.get(id).map(|record| record.last_connection)
    }

    pub fn death_count(&self, id: PlayerId) -> Option<u32> {
        self.get(id).map(|record| record.deaths)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Creates the record with no deaths, or refreshes its connection time.
    pub fn upsert_on_connect(&mut self, id: PlayerId, now: Timestamp) -> &PlayerRecord {
        self.touch_connection(id, now)
    }

    /// Same update rule as [`Self::upsert_on_connect`].
    pub fn upsert_on_disconnect(&mut self, id: PlayerId, now: Timestamp) -> &PlayerRecord {
        self.touch_connection(id, now)
    }

    /// Creates the record with one death, or increments the death count.
    ///
    /// The connection time of an existing record is left unchanged.
    pub fn record_death(&mut self, id: PlayerId, now: Timestamp) -> &PlayerRecord {
        self.dirty = true;
        self.records
            .players
            .entry(id)
            .and_modify(|record| record.deaths = record.deaths.saturating_add(1))
            .or_insert_with(|| PlayerRecord::died(now))
    }

    /// Discards every record.
    pub fn reset(&mut self) {
        self.records = RecordCollection::new();
        self.dirty = true;
    }

    /// Returns a complete copy of the current collection.
    pub fn snapshot(&self) -> RecordCollection {
        self.records.clone()
    }

    /// Borrows the current collection without cloning it.
    pub fn collection(&self) -> &RecordCollection {
        &self.records
    }

    /// True if a mutation happened since the last successful write.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn touch_connection(&mut self, id: PlayerId, now: Timestamp) -> &PlayerRecord {
        self.dirty = true;
        self.records
            .players
            .entry(id)
            .and_modify(|record| record.last_connection = now)
            .or_insert_with(|| PlayerRecord::connected(now))
    }
}
