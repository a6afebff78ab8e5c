use std::time::Duration;

use pacman_common::GhostIdentity;
use pacman_core::RegistryError;
use tokio::sync::mpsc;

mod common;
use common::test_app_state;

#[tokio::test]
async fn join_ready_and_start_reaches_game_started() {
    let state = test_app_state();
    let code = state.registry.create_room();

    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    state
        .registry
        .join_room(&code, "conn-a".into(), "Alice".into(), GhostIdentity::Blinky, tx_a)
        .await
        .expect("join succeeds");

    let handle = state.registry.get(&code).expect("room exists");
    handle.toggle_ready("conn-a".to_string()).await.expect("toggle ready");
    handle.start().await.expect("room starts once everyone is ready");

    let mut saw_started = false;
    while let Ok(Some(msg)) = tokio::time::timeout(Duration::from_millis(200), rx_a.recv()).await {
        if matches!(msg, pacman_common::message::ServerMessage::GameStarted) {
            saw_started = true;
            break;
        }
    }
    assert!(saw_started, "expected a gameStarted broadcast after start()");
}

#[tokio::test]
async fn starting_without_everyone_ready_is_rejected() {
    let state = test_app_state();
    let code = state.registry.create_room();

    let (tx, _rx) = mpsc::unbounded_channel();
    state
        .registry
        .join_room(&code, "conn-a".into(), "Alice".into(), GhostIdentity::Blinky, tx)
        .await
        .unwrap();

    let handle = state.registry.get(&code).unwrap();
    let err = handle.start().await.unwrap_err();
    assert!(matches!(err, pacman_core::RoomError::NotAllReady));
}

#[tokio::test]
async fn duplicate_ghost_identity_is_rejected() {
    let state = test_app_state();
    let code = state.registry.create_room();

    let (tx_a, _rx_a) = mpsc::unbounded_channel();
    state
        .registry
        .join_room(&code, "conn-a".into(), "Alice".into(), GhostIdentity::Blinky, tx_a)
        .await
        .unwrap();

    let (tx_b, _rx_b) = mpsc::unbounded_channel();
    let err = state
        .registry
        .join_room(&code, "conn-b".into(), "Bob".into(), GhostIdentity::Blinky, tx_b)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        pacman_server::registry::JoinError::Room(pacman_core::RoomError::GhostTaken(GhostIdentity::Blinky))
    ));
}

#[tokio::test]
async fn joining_an_unknown_room_code_is_room_not_found() {
    let state = test_app_state();
    let (tx, _rx) = mpsc::unbounded_channel();
    let err = state
        .registry
        .join_room("ZZZZ", "conn-a".into(), "Alice".into(), GhostIdentity::Blinky, tx)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        pacman_server::registry::JoinError::Registry(RegistryError::RoomNotFound)
    ));
}

#[tokio::test]
async fn last_player_leaving_tears_down_the_room() {
    let state = test_app_state();
    let code = state.registry.create_room();

    let (tx, _rx) = mpsc::unbounded_channel();
    state
        .registry
        .join_room(&code, "conn-a".into(), "Alice".into(), GhostIdentity::Blinky, tx)
        .await
        .unwrap();

    state.registry.handle_disconnect("conn-a");

    // Teardown happens asynchronously off the room task's event; give it a
    // moment to propagate to the registry before asserting.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(matches!(state.registry.get(&code), Err(RegistryError::RoomNotFound)));
}
