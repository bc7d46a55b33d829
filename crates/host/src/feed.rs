//! Newline-delimited JSON event feed read by the host harness.

use records_core::{PlayerId, Timestamp};
use records_runtime::{RecordsHandle, RuntimeError};
use serde::{Deserialize, Serialize};

/// One line of the event feed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostLine {
    Connected {
        player: PlayerId,
    },
    Disconnected {
        player: PlayerId,
        #[serde(default)]
        reason: String,
    },
    Died {
        player: PlayerId,
    },
    Checkpoint,
    WorldReset {
        save_name: String,
    },
    Query {
        player: PlayerId,
    },
}

/// Answer to a `query` line. Unknown players have both fields `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryReply {
    pub player: PlayerId,
    pub last_connection: Option<Timestamp>,
    pub deaths: Option<u32>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum FeedOutcome {
    Applied,
    Reply(QueryReply),
}

/// Forwards one feed line to the record store.
///
/// A failed checkpoint or reset write is logged and the feed continues; the
/// records stay in memory for the next checkpoint. Any other error stops the
/// host.
pub async fn apply(handle: &RecordsHandle, line: HostLine) -> Result<FeedOutcome, RuntimeError> {
    let result = match line {
        HostLine::Connected { player } => handle.player_connected(player).await,
        HostLine::Disconnected { player, reason } => {
            handle.player_disconnected(player, &reason).await
        }
        HostLine::Died { player } => handle.player_died(player).await,
        HostLine::Checkpoint => handle.checkpoint().await,
        HostLine::WorldReset { save_name } => handle.world_reset(&save_name).await,
        HostLine::Query { player } => {
            let reply = QueryReply {
                player,
                last_connection: handle.last_connection_time(player).await?,
                deaths: handle.death_count(player).await?,
            };
            return Ok(FeedOutcome::Reply(reply));
        }
    };

    match result {
        Ok(()) => Ok(FeedOutcome::Applied),
        Err(e) if e.is_retryable_write() => {
            tracing::warn!("Write failed, records kept in memory: {}", e);
            Ok(FeedOutcome::Applied)
        }
        Err(e) => Err(e),
    }
}
