//! Record types held by the store and written to the durable document.

use std::collections::BTreeMap;
use std::collections::btree_map;

use crate::types::{PlayerId, Timestamp};

/// Statistics tracked for a single player.
///
/// The owning [`PlayerId`] is the key of the enclosing [`RecordCollection`]
/// and is not repeated here.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerRecord {
    /// Last time the player connected or disconnected.
    pub last_connection: Timestamp,
    /// Number of deaths observed since the collection was created.
    pub deaths: u32,
}

impl PlayerRecord {
    /// Record for a player first seen through a connect or disconnect.
    pub fn connected(at: Timestamp) -> Self {
        Self {
            last_connection: at,
            deaths: 0,
        }
    }

    /// Record for a player first seen through a death.
    pub fn died(at: Timestamp) -> Self {
        Self {
            last_connection: at,
            deaths: 1,
        }
    }
}

/// Complete set of player records for one activation.
///
/// This is also the shape of the durable document: a single `players` field
/// mapping the decimal player id to its record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecordCollection {
    pub players: BTreeMap<PlayerId, PlayerRecord>,
}

impl RecordCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: PlayerId) -> Option<&PlayerRecord> {
        self.players.get(&id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, PlayerId, PlayerRecord> {
        self.players.iter()
    }
}

impl FromIterator<(PlayerId, PlayerRecord)> for RecordCollection {
    fn from_iter<I: IntoIterator<Item = (PlayerId, PlayerRecord)>>(iter: I) -> Self {
        Self {
            players: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RecordCollection {
    type Item = (&'a PlayerId, &'a PlayerRecord);
    type IntoIter = btree_map::Iter<'a, PlayerId, PlayerRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.players.iter()
    }
}
