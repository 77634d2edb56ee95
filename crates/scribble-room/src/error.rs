//! Error types for the room layer.

use scribble_protocol::{ParticipantId, RoomId};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room is full, no more participant slots available.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The participant is already in this room.
    #[error("participant {0} already in room {1}")]
    AlreadyInRoom(ParticipantId, RoomId),

    /// The participant is not in this room.
    #[error("participant {0} not in room {1}")]
    NotInRoom(ParticipantId, RoomId),

    /// The game settings cannot run a game.
    #[error("invalid game config: {0}")]
    InvalidConfig(String),

    /// The room's actor has stopped and no longer takes commands.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
