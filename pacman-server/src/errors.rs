/// Maps a room-lifecycle protocol error to the wire-level reason string a
/// connection receives in a `ServerMessage::Error` frame. Every variant here
/// is a client protocol error: surfaced to the caller, never fatal to the
/// room.
pub fn room_error_reason(err: &pacman_core::RoomError) -> &'static str {
    use pacman_core::RoomError;
    match err {
        RoomError::RoomStarted => "RoomStarted",
        RoomError::RoomFull => "RoomFull",
        RoomError::GhostTaken(_) => "GhostTaken",
        RoomError::NotAllReady => "NotAllReady",
        RoomError::NotGameOver => "NotGameOver",
        RoomError::UnknownPlayer => "UnknownPlayer",
        RoomError::Invariant(_) => "Internal",
    }
}

pub fn registry_error_reason(err: &pacman_core::RegistryError) -> &'static str {
    use pacman_core::RegistryError;
    match err {
        RegistryError::RoomNotFound => "RoomNotFound",
        RegistryError::CodeExhausted => "Internal",
    }
}
