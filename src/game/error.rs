use crate::types::{GamePhase, PolicyStep};

/// Result type for state machine handlers
pub type GameResult<T> = Result<T, Rejection>;

/// Why the state machine refused an action. State is untouched on rejection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("Action not allowed in {actual:?} phase (expected {expected:?})")]
    WrongPhase {
        expected: GamePhase,
        actual: GamePhase,
    },

    #[error("Action not allowed during the {0:?} step")]
    WrongStep(PolicyStep),

    #[error("It is not this player's turn to act")]
    NotYourTurn,

    #[error("Unknown player {0}")]
    UnknownPlayer(String),

    #[error("Player {0} is not alive")]
    PlayerDead(String),

    #[error("Invalid target {0}")]
    InvalidTarget(String),

    #[error("Player {0} is term limited")]
    TermLimited(String),

    #[error("Player has already voted")]
    AlreadyVoted,

    #[error("Veto requires five enacted fascist policies")]
    VetoLocked,

    #[error("Policy is not in the current hand")]
    PolicyNotInHand,

    #[error("Player {0} was already investigated")]
    AlreadyInvestigated(String),

    #[error("A target is required for this power")]
    MissingTarget,

    #[error("The game is already over")]
    GameFinished,

    #[error("Unsupported player count {0}")]
    UnsupportedPlayerCount(usize),

    #[error("Duplicate player id {0}")]
    DuplicatePlayer(String),
}
