use crate::game::Rejection;
use crate::protocol::ServerMessage;

/// Registry failures. These go back to the requesting client only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Room {0} not found")]
    RoomNotFound(String),

    #[error("A game is already in progress")]
    GameInProgress,

    #[error("Room is full")]
    RoomFull,

    #[error("Not in a room")]
    NotInRoom,

    #[error("Already in a room")]
    AlreadyInRoom,

    #[error("Only the host can {0}")]
    NotHost(&'static str),

    #[error("Games need 5 to 10 players, room has {0}")]
    WrongPlayerCount(usize),

    #[error("Unknown player {0}")]
    UnknownPlayer(String),

    #[error("Names must be 1 to 24 characters")]
    InvalidName,

    #[error("No active game")]
    NoActiveGame,

    #[error("Message was empty after sanitizing")]
    EmptyMessage,
}

impl RegistryError {
    /// Stable code for the wire
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::RoomNotFound(_) => "ROOM_NOT_FOUND",
            RegistryError::GameInProgress => "GAME_IN_PROGRESS",
            RegistryError::RoomFull => "ROOM_FULL",
            RegistryError::NotInRoom => "NOT_IN_ROOM",
            RegistryError::AlreadyInRoom => "ALREADY_IN_ROOM",
            RegistryError::NotHost(_) => "NOT_HOST",
            RegistryError::WrongPlayerCount(_) => "WRONG_PLAYER_COUNT",
            RegistryError::UnknownPlayer(_) => "UNKNOWN_PLAYER",
            RegistryError::InvalidName => "INVALID_NAME",
            RegistryError::NoActiveGame => "NO_ACTIVE_GAME",
            RegistryError::EmptyMessage => "EMPTY_MESSAGE",
        }
    }
}

impl From<RegistryError> for ServerMessage {
    fn from(err: RegistryError) -> Self {
        ServerMessage::error(err.code(), err.to_string())
    }
}

/// Anything that can stop a player action from taking effect
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Rule violation; dropped without a reply
    #[error(transparent)]
    Rejected(#[from] Rejection),
}
