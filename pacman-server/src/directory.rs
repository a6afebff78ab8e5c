//! The optional shared room directory: on room creation the registry may
//! publish `{roomCode -> {instanceId, createdAt, playerCount}}` to an
//! external directory with a 1-hour TTL so that other server instances (or
//! a lobby-listing service) can discover rooms this process owns. No such
//! external system is part of this crate — this module defines the trait
//! boundary and a no-op default, so an optional integration that isn't
//! configured falls back to a dummy store rather than failing startup.
//!
//! All operations are fire-and-forget: failures are logged and never block
//! room creation or block a tick.
use std::time::Duration;

use serde::Serialize;

/// One entry a `RoomDirectory` publishes per room.
#[derive(Debug, Clone, Serialize)]
pub struct RoomDirectoryEntry {
    pub room_code: String,
    pub instance_id: String,
    pub created_at_unix_ms: u64,
    pub player_count: usize,
}

/// A pluggable publication target for room metadata. Every method is
/// fire-and-forget from the registry's point of view: an `Err` is logged by
/// the caller and otherwise ignored.
#[async_trait::async_trait]
pub trait RoomDirectory: Send + Sync {
    async fn publish(&self, entry: RoomDirectoryEntry, ttl: Duration) -> anyhow::Result<()>;
    async fn update_player_count(&self, room_code: &str, player_count: usize) -> anyhow::Result<()>;
    async fn remove(&self, room_code: &str) -> anyhow::Result<()>;
}

/// The default directory: does nothing. Used whenever no external directory
/// is configured, which is the only mode this crate ships with today.
pub struct NoopDirectory;

#[async_trait::async_trait]
impl RoomDirectory for NoopDirectory {
    async fn publish(&self, entry: RoomDirectoryEntry, _ttl: Duration) -> anyhow::Result<()> {
        tracing::debug!(room_code = %entry.room_code, "no shared room directory configured; skipping publish");
        Ok(())
    }

    async fn update_player_count(&self, _room_code: &str, _player_count: usize) -> anyhow::Result<()> {
        Ok(())
    }

    async fn remove(&self, _room_code: &str) -> anyhow::Result<()> {
        Ok(())
    }
}
