//! Lifecycle events raised by the host.

use std::fmt;

use chrono::Utc;
use records_core::{PlayerId, Timestamp};

/// Notification delivered by the host while the store is active.
///
/// Activation start and end are not events; they map to
/// [`super::Lifecycle::activate`] and [`super::Lifecycle::deactivate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
    PlayerConnected {
        player: PlayerId,
        at: Timestamp,
    },
    PlayerDisconnected {
        player: PlayerId,
        reason: String,
        at: Timestamp,
    },
    PlayerDied {
        player: PlayerId,
        at: Timestamp,
    },
    /// Host asks for the current state to be written.
    PeriodicCheckpoint,
    /// The world was regenerated; all history is void.
    WorldReset {
        save_name: String,
    },
}

impl LifecycleEvent {
    pub fn connected(player: PlayerId) -> Self {
        Self::PlayerConnected {
            player,
            at: Utc::now(),
        }
    }

    pub fn disconnected(player: PlayerId, reason: impl Into<String>) -> Self {
        Self::PlayerDisconnected {
            player,
            reason: reason.into(),
            at: Utc::now(),
        }
    }

    pub fn died(player: PlayerId) -> Self {
        Self::PlayerDied {
            player,
            at: Utc::now(),
        }
    }

    pub fn world_reset(save_name: impl Into<String>) -> Self {
        Self::WorldReset {
            save_name: save_name.into(),
        }
    }

    /// Player the event refers to, if any.
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            Self::PlayerConnected { player, .. }
            | Self::PlayerDisconnected { player, .. }
            | Self::PlayerDied { player, .. } => Some(*player),
            Self::PeriodicCheckpoint | Self::WorldReset { .. } => None,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::PlayerConnected { .. } => "player_connected",
            Self::PlayerDisconnected { .. } => "player_disconnected",
            Self::PlayerDied { .. } => "player_died",
            Self::PeriodicCheckpoint => "periodic_checkpoint",
            Self::WorldReset { .. } => "world_reset",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.player() {
            Some(player) => write!(f, "{}({})", self.name(), player),
            None => f.write_str(self.name()),
        }
    }
}
