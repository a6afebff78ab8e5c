//! `RoomRegistry`: room creation/lookup/teardown, the player→room index, room
//! code allocation, and the optional shared-directory publication. Keyed
//! state lives in an `Arc<DashMap<...>>`, with a background `tokio::spawn`
//! + `tokio::select!` loop for TTL sweeping.
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use pacman_common::message::GameStateSnapshot;
use pacman_common::GhostIdentity;
use pacman_core::brains::TabularPolicy;
use pacman_core::{Maze, RegistryError, RoomConfig, RoomError};
use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::directory::{RoomDirectory, RoomDirectoryEntry};
use crate::room_actor::{self, Outbox, RoomEvent, RoomHandle};

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LENGTH: usize = 4;
const MAX_CODE_ATTEMPTS: usize = 64;

struct RoomEntry {
    handle: RoomHandle,
    created_at: std::time::Instant,
}

pub struct RoomRegistry {
    maze: Arc<Maze>,
    room_config: RoomConfig,
    tabular_policy: Mutex<Option<TabularPolicy>>,
    rooms: DashMap<String, RoomEntry>,
    players: DashMap<String, String>,
    directory: Arc<dyn RoomDirectory>,
    instance_id: String,
    room_ttl: Duration,
    rng: Mutex<SmallRng>,
    events_tx: mpsc::UnboundedSender<RoomEvent>,
}

impl RoomRegistry {
    pub fn new(maze: Arc<Maze>, room_config: RoomConfig, room_ttl: Duration, directory: Arc<dyn RoomDirectory>) -> Arc<Self> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let registry = Arc::new(RoomRegistry {
            maze,
            room_config,
            tabular_policy: Mutex::new(None),
            rooms: DashMap::new(),
            players: DashMap::new(),
            directory,
            instance_id: format!("{:016x}", rand::random::<u64>()),
            room_ttl,
            rng: Mutex::new(SmallRng::from_os_rng()),
            events_tx,
        });
        tokio::spawn(Arc::clone(&registry).drain_events(events_rx));
        tokio::spawn(Arc::clone(&registry).sweep_expired_rooms());
        registry
    }

    /// Installs the pre-trained tabular policy so that every room created
    /// from this point forward gets it pre-installed. Rooms created before
    /// the model finished loading keep using the heuristic brains for their
    /// whole match; there is no retroactive upgrade mid-room — upgrading an
    /// in-flight `GameRoom` would race with its owning task, so the upgrade
    /// point is room creation.
    pub fn install_tabular_policy(&self, policy: TabularPolicy) {
        *self.tabular_policy.lock() = Some(policy);
    }

    pub fn create_room(&self) -> String {
        let code = self.allocate_code();
        let tabular = self.tabular_policy.lock().clone();
        let handle = room_actor::spawn(
            code.clone(),
            Arc::clone(&self.maze),
            self.room_config,
            tabular,
            self.events_tx.clone(),
        );
        self.rooms.insert(
            code.clone(),
            RoomEntry {
                handle,
                created_at: std::time::Instant::now(),
            },
        );
        info!(room_code = %code, "room created");

        let directory = Arc::clone(&self.directory);
        let instance_id = self.instance_id.clone();
        let ttl = self.room_ttl;
        let entry = RoomDirectoryEntry {
            room_code: code.clone(),
            instance_id,
            created_at_unix_ms: unix_millis(),
            player_count: 0,
        };
        tokio::spawn(async move {
            if let Err(err) = directory.publish(entry, ttl).await {
                warn!(error = %err, "failed to publish room to shared directory");
            }
        });

        code
    }

    pub fn get(&self, code: &str) -> Result<RoomHandle, RegistryError> {
        self.rooms
            .get(code)
            .map(|entry| entry.handle.clone())
            .ok_or(RegistryError::RoomNotFound)
    }

    pub async fn join_room(
        &self,
        code: &str,
        connection_id: String,
        name: String,
        ghost: GhostIdentity,
        outbox: Outbox,
    ) -> Result<GameStateSnapshot, JoinError> {
        let handle = self.get(code).map_err(JoinError::Registry)?;
        let snapshot = handle
            .join(connection_id.clone(), name, ghost, outbox)
            .await
            .map_err(JoinError::Room)?;
        self.players.insert(connection_id, code.to_string());
        Ok(snapshot)
    }

    pub fn room_for_player(&self, connection_id: &str) -> Option<RoomHandle> {
        let code = self.players.get(connection_id)?;
        self.get(&code).ok()
    }

    /// Looks up the player's room and forwards the disconnect, then clears
    /// the player→room mapping. Fire-and-forget: a disconnect is never an
    /// error the caller needs to see.
    pub fn handle_disconnect(&self, connection_id: &str) {
        if let Some((_, code)) = self.players.remove(connection_id) {
            if let Some(entry) = self.rooms.get(&code) {
                entry.handle.leave(connection_id.to_string());
            }
        }
    }

    fn allocate_code(&self) -> String {
        let mut rng = self.rng.lock();
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code: String = (0..CODE_LENGTH)
                .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
                .collect();
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
        // Astronomically unlikely at any realistic room count (36^4 = 1.68M
        // combinations), but an infinite retry loop is worse than a
        // duplicate-looking code that gets rejected by `contains_key` on
        // the next `create_room` call.
        warn!("room code space exhausted after {MAX_CODE_ATTEMPTS} attempts; returning a possibly-colliding code");
        (0..CODE_LENGTH)
            .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
            .collect()
    }

    async fn drain_events(self: Arc<Self>, mut events: mpsc::UnboundedReceiver<RoomEvent>) {
        while let Some(event) = events.recv().await {
            match event {
                RoomEvent::Empty(code) => self.teardown(&code).await,
            }
        }
    }

    async fn sweep_expired_rooms(self: Arc<Self>) {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let expired: Vec<String> = self
                .rooms
                .iter()
                .filter(|entry| entry.created_at.elapsed() >= self.room_ttl)
                .map(|entry| entry.key().clone())
                .collect();
            for code in expired {
                info!(room_code = %code, "room exceeded its absolute TTL; tearing down");
                self.teardown(&code).await;
            }
        }
    }

    /// Idempotent: removing a code that is already gone is a no-op.
    async fn teardown(&self, code: &str) {
        if self.rooms.remove(code).is_none() {
            return;
        }
        self.players.retain(|_, room_code| room_code != code);
        if let Err(err) = self.directory.remove(code).await {
            warn!(error = %err, room_code = %code, "failed to remove room from shared directory");
        }
    }
}

#[derive(Debug)]
pub enum JoinError {
    Registry(RegistryError),
    Room(RoomError),
}

impl std::fmt::Display for JoinError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinError::Registry(err) => write!(f, "{err}"),
            JoinError::Room(err) => write!(f, "{err}"),
        }
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacman_core::maze::StartingPositions;

    fn test_registry() -> Arc<RoomRegistry> {
        let starting_positions = StartingPositions {
            pacman: pacman_common::Position::new(1, 1),
            ghost_house: pacman_common::Position::new(1, 1),
            blinky: pacman_common::Position::new(1, 1),
            pinky: pacman_common::Position::new(1, 1),
            inky: pacman_common::Position::new(1, 1),
            clyde: pacman_common::Position::new(1, 1),
        };
        let maze = Arc::new(Maze::from_layout(&["###", "#.#", "###"], starting_positions).unwrap());
        RoomRegistry::new(
            maze,
            RoomConfig::default(),
            Duration::from_secs(3600),
            Arc::new(crate::directory::NoopDirectory),
        )
    }

    #[tokio::test]
    async fn created_room_codes_are_four_alphanumeric_characters() {
        let registry = test_registry();
        let code = registry.create_room();
        assert_eq!(code.len(), 4);
        assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn unknown_room_code_is_room_not_found() {
        let registry = test_registry();
        assert!(matches!(registry.get("ZZZZ"), Err(RegistryError::RoomNotFound)));
    }

    #[tokio::test]
    async fn join_then_disconnect_clears_the_player_index() {
        let registry = test_registry();
        let code = registry.create_room();
        let (tx, _rx) = mpsc::unbounded_channel();
        registry
            .join_room(&code, "conn-1".into(), "Alice".into(), GhostIdentity::Blinky, tx)
            .await
            .unwrap();
        assert!(registry.room_for_player("conn-1").is_some());
        registry.handle_disconnect("conn-1");
        assert!(registry.room_for_player("conn-1").is_none());
    }
}
