use crate::store::StoreError;
use roomcast_core::ServerEvent;
use thiserror::Error;

/// Coordinator error type.
///
/// Every variant is local to the connection whose request triggered it;
/// `RoomFull` maps to the dedicated `full` event, everything else
/// user-visible maps to `error`.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Request was missing a required field.
    #[error("{0}")]
    Validation(String),

    /// Room does not exist in the live table.
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    /// Identity unknown to the persistence collaborator.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Kick target is not a member of the room.
    #[error("User {target} is not a member of {room}")]
    TargetNotFound { room: String, target: String },

    /// Wrong room password.
    #[error("Incorrect password for room {0}")]
    AuthFailed(String),

    /// Room is at capacity.
    #[error("Room {0} is full")]
    RoomFull(String),

    /// Kick requested by a non-creator.
    #[error("Only the room creator can kick users")]
    NotAuthorized,

    /// Registry resolved an identity to a dead transport.
    #[error("Connection for {0} is stale")]
    StaleConnection(String),

    /// Persistence collaborator call failed; the live mutation was rolled back.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RelayError {
    pub fn into_event(self) -> ServerEvent {
        match self {
            RelayError::RoomFull(room_name) => ServerEvent::Full { room_name },
            other => ServerEvent::Error {
                message: other.to_string(),
            },
        }
    }
}
