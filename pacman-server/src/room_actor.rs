//! The per-room owning context: one task per `GameRoom`, driving its fixed
//! tick, the once-per-second timer broadcast, and every mutation to its
//! state from a single-consumer command queue. No other task ever touches a
//! `GameRoom` directly — `RoomRegistry` and the transport layer only ever
//! hold a `RoomHandle` and talk to this task over channels, which is what
//! makes the ordering rule ("input application order is the order messages
//! arrived at the room") hold for free: every command and every tick is
//! handled by the same `select!` loop, one at a time.
//!
//! Follows a "one task owns the state, fans out events" shape: a
//! `broadcast::Sender` for outbound events alongside the command channel.
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pacman_common::message::{ClientMessage, GameStateSnapshot, ServerMessage};
use pacman_common::{Direction, GhostIdentity};
use pacman_core::brains::TabularPolicy;
use pacman_core::{GameRoom, Maze, RoomConfig, RoomError};
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// An outbound channel to exactly one connection. Used both for direct
/// replies (`gameState` on join/request) and for room-wide broadcasts
/// (`gameUpdate`, `timerUpdate`, `gameOver`, ...).
pub type Outbox = mpsc::UnboundedSender<ServerMessage>;

/// A command delivered to a room's owning task. Every variant that can fail
/// a client-visible way carries a `oneshot` so the transport layer can
/// surface the result; fire-and-forget variants (`Leave`, `Input`) have
/// none, since a buffered input doesn't need a round trip and leaving an
/// already-gone connection is not an error.
pub enum RoomCommand {
    Join {
        connection_id: String,
        name: String,
        ghost: GhostIdentity,
        outbox: Outbox,
        respond: oneshot::Sender<Result<GameStateSnapshot, RoomError>>,
    },
    Leave {
        connection_id: String,
    },
    ToggleReady {
        connection_id: String,
        respond: oneshot::Sender<Result<(), RoomError>>,
    },
    Start {
        respond: oneshot::Sender<Result<(), RoomError>>,
    },
    Restart {
        respond: oneshot::Sender<Result<(), RoomError>>,
    },
    Input {
        connection_id: String,
        direction: Direction,
    },
    RequestState {
        connection_id: String,
    },
}

/// Events the room's owning task reports back to the registry. The registry
/// never mutates a room directly; it only reacts to these.
pub enum RoomEvent {
    /// Every player has left; the registry should drop this room's handle
    /// immediately.
    Empty(String),
}

#[derive(Clone)]
pub struct RoomHandle {
    code: String,
    commands: mpsc::UnboundedSender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &str {
        &self.code
    }

    pub async fn join(
        &self,
        connection_id: String,
        name: String,
        ghost: GhostIdentity,
        outbox: Outbox,
    ) -> Result<GameStateSnapshot, RoomError> {
        let (respond, rx) = oneshot::channel();
        if self
            .commands
            .send(RoomCommand::Join {
                connection_id,
                name,
                ghost,
                outbox,
                respond,
            })
            .is_err()
        {
            return Err(RoomError::Invariant("room task is gone".into()));
        }
        rx.await
            .unwrap_or_else(|_| Err(RoomError::Invariant("room task dropped the reply".into())))
    }

    pub fn leave(&self, connection_id: String) {
        let _ = self.commands.send(RoomCommand::Leave { connection_id });
    }

    pub async fn toggle_ready(&self, connection_id: String) -> Result<(), RoomError> {
        self.round_trip(|respond| RoomCommand::ToggleReady {
            connection_id,
            respond,
        })
        .await
    }

    pub async fn start(&self) -> Result<(), RoomError> {
        self.round_trip(|respond| RoomCommand::Start { respond }).await
    }

    pub async fn restart(&self) -> Result<(), RoomError> {
        self.round_trip(|respond| RoomCommand::Restart { respond }).await
    }

    pub fn submit_input(&self, connection_id: String, direction: Direction) {
        let _ = self.commands.send(RoomCommand::Input {
            connection_id,
            direction,
        });
    }

    pub fn request_state(&self, connection_id: String) {
        let _ = self.commands.send(RoomCommand::RequestState { connection_id });
    }

    async fn round_trip(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<(), RoomError>>) -> RoomCommand,
    ) -> Result<(), RoomError> {
        let (respond, rx) = oneshot::channel();
        if self.commands.send(make(respond)).is_err() {
            return Err(RoomError::Invariant("room task is gone".into()));
        }
        rx.await.unwrap_or_else(|_| Err(RoomError::Invariant("room task dropped the reply".into())))
    }
}

/// Spawns the owning task for a new room and returns a cheap, cloneable
/// handle to it.
pub fn spawn(
    code: String,
    maze: Arc<Maze>,
    config: RoomConfig,
    tabular: Option<TabularPolicy>,
    events: mpsc::UnboundedSender<RoomEvent>,
) -> RoomHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = RoomHandle {
        code: code.clone(),
        commands: tx,
    };
    tokio::spawn(run(code, maze, config, tabular, rx, events));
    handle
}

async fn run(
    code: String,
    maze: Arc<Maze>,
    config: RoomConfig,
    tabular: Option<TabularPolicy>,
    mut commands: mpsc::UnboundedReceiver<RoomCommand>,
    events: mpsc::UnboundedSender<RoomEvent>,
) {
    let mut room = GameRoom::new(code.clone(), maze, config);
    if let Some(policy) = tabular {
        room.install_tabular_policy(policy);
    }
    let mut outboxes: HashMap<String, Outbox> = HashMap::new();
    let mut tick_interval: Option<tokio::time::Interval> = None;
    let mut timer_interval: Option<tokio::time::Interval> = None;

    loop {
        tokio::select! {
            maybe_cmd = commands.recv() => {
                match maybe_cmd {
                    Some(cmd) => handle_command(&mut room, &mut outboxes, cmd, &mut tick_interval, &mut timer_interval),
                    None => break,
                }
            }
            _ = tick_fut(&mut tick_interval), if tick_interval.is_some() => {
                let output = room.tick(Instant::now());
                broadcast(&outboxes, ServerMessage::GameUpdate(output.delta));
                if let Some((winner, reason)) = output.game_over {
                    info!(room = %code, ?winner, "match finished");
                    broadcast(&outboxes, ServerMessage::GameOver { winner, reason, score: room.current_state().score });
                    tick_interval = None;
                    timer_interval = None;
                }
            }
            _ = tick_fut(&mut timer_interval), if timer_interval.is_some() => {
                broadcast(&outboxes, ServerMessage::TimerUpdate {
                    time_remaining_ms: room.time_remaining_ms(Instant::now()),
                });
            }
        }

        if room.player_count() == 0 {
            let _ = events.send(RoomEvent::Empty(code.clone()));
            break;
        }
    }
}

/// Awaits the next tick of an optional interval. Only ever polled while its
/// `select!` guard is `true`, so the `unwrap` is load-bearing on that
/// invariant rather than a real fallibility.
async fn tick_fut(interval: &mut Option<tokio::time::Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn handle_command(
    room: &mut GameRoom,
    outboxes: &mut HashMap<String, Outbox>,
    cmd: RoomCommand,
    tick_interval: &mut Option<tokio::time::Interval>,
    timer_interval: &mut Option<tokio::time::Interval>,
) {
    match cmd {
        RoomCommand::Join {
            connection_id,
            name,
            ghost,
            outbox,
            respond,
        } => {
            let result = room.add_player(connection_id.clone(), name, ghost).map(|()| room.current_state());
            if result.is_ok() {
                outboxes.insert(connection_id, outbox);
            }
            let _ = respond.send(result);
        }
        RoomCommand::Leave { connection_id } => {
            let now_empty = room.remove_player(&connection_id);
            outboxes.remove(&connection_id);
            if !now_empty {
                broadcast(outboxes, ServerMessage::PlayerLeft { connection_id });
            }
        }
        RoomCommand::ToggleReady { connection_id, respond } => {
            let _ = respond.send(room.toggle_ready(&connection_id));
        }
        RoomCommand::Start { respond } => {
            let result = room.start(Instant::now());
            if result.is_ok() {
                *tick_interval = Some(new_interval(room.tick_period()));
                *timer_interval = Some(new_interval(Duration::from_secs(1)));
                broadcast(outboxes, ServerMessage::GameStarted);
            }
            let _ = respond.send(result);
        }
        RoomCommand::Restart { respond } => {
            let result = room.restart(Instant::now());
            if result.is_ok() {
                *tick_interval = Some(new_interval(room.tick_period()));
                *timer_interval = Some(new_interval(Duration::from_secs(1)));
                broadcast(outboxes, ServerMessage::GameRestarted);
            }
            let _ = respond.send(result);
        }
        RoomCommand::Input { connection_id, direction } => {
            if let Err(err) = room.submit_input(&connection_id, direction) {
                warn!(error = %err, connection_id, "dropped input for unknown player");
            }
        }
        RoomCommand::RequestState { connection_id } => {
            if let Some(outbox) = outboxes.get(&connection_id) {
                let _ = outbox.send(ServerMessage::GameState(room.current_state()));
            }
        }
    }
}

fn new_interval(period: Duration) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

fn broadcast(outboxes: &HashMap<String, Outbox>, message: ServerMessage) {
    for outbox in outboxes.values() {
        let _ = outbox.send(message.clone());
    }
}

/// Routes one already-deserialized client message to the room it names. The
/// transport layer calls this after resolving `room_code` to a `RoomHandle`
/// for every variant except `CreateRoom`, which the registry handles itself.
pub async fn dispatch(
    handle: &RoomHandle,
    connection_id: &str,
    outbox: &Outbox,
    message: ClientMessage,
) {
    match message {
        ClientMessage::CreateRoom => {
            // Handled by the registry before a `RoomHandle` exists.
        }
        ClientMessage::JoinRoom { .. } => {
            // Handled by the registry, which owns room lookup.
        }
        ClientMessage::ToggleReady { .. } => {
            if let Err(err) = handle.toggle_ready(connection_id.to_string()).await {
                let _ = outbox.send(ServerMessage::Error {
                    reason: crate::errors::room_error_reason(&err).to_string(),
                });
            }
        }
        ClientMessage::StartGame { .. } => {
            if let Err(err) = handle.start().await {
                let _ = outbox.send(ServerMessage::Error {
                    reason: crate::errors::room_error_reason(&err).to_string(),
                });
            }
        }
        ClientMessage::RestartGame { .. } => {
            if let Err(err) = handle.restart().await {
                let _ = outbox.send(ServerMessage::Error {
                    reason: crate::errors::room_error_reason(&err).to_string(),
                });
            }
        }
        ClientMessage::PlayerInput { direction, .. } => {
            handle.submit_input(connection_id.to_string(), direction);
        }
        ClientMessage::RequestGameState { .. } => {
            handle.request_state(connection_id.to_string());
        }
    }
}
