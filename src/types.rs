use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type PlayerId = String;
pub type RoomCode = String;
pub type ConnectionId = String;

/// Minimum and maximum number of seats a game supports
pub const MIN_PLAYERS: usize = 5;
pub const MAX_PLAYERS: usize = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Liberal,
    Fascist,
    Hitler,
}

impl Role {
    /// Party membership as revealed by an investigation. Hitler is a fascist.
    pub fn party(self) -> Party {
        match self {
            Role::Liberal => Party::Liberal,
            Role::Fascist | Role::Hitler => Party::Fascist,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Party {
    Liberal,
    Fascist,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Policy {
    Liberal,
    Fascist,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    Nominate,
    Vote,
    Policy,
    Power,
    GameOver,
}

/// Sub-state of the legislative session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyStep {
    President,
    Chancellor,
    Veto,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Power {
    Investigate,
    SpecialElection,
    PolicyPeek,
    Execution,
}

impl Power {
    /// Whether the power is used against a chosen player
    pub fn needs_target(self) -> bool {
        !matches!(self, Power::PolicyPeek)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Winner {
    Liberals,
    Fascists,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WinReason {
    LiberalPolicies,
    FascistPolicies,
    HitlerElected,
    HitlerExecuted,
}

/// Victory payload: `{winner, reason}`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameOver {
    pub winner: Winner,
    pub reason: WinReason,
}

impl GameOver {
    pub fn new(winner: Winner, reason: WinReason) -> Self {
        Self { winner, reason }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnactedPolicies {
    pub liberal: u8,
    pub fascist: u8,
}

impl EnactedPolicies {
    pub fn total(&self) -> usize {
        self.liberal as usize + self.fascist as usize
    }
}

/// A single seat in the authoritative game snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GamePlayer {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
    pub alive: bool,
    pub has_voted: bool,
    pub current_vote: Option<bool>,
}

/// One recorded ballot from a resolved election
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ballot {
    pub player_id: PlayerId,
    pub ja: bool,
}

/// Semantic events recorded in the append-only game history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryEvent {
    Nomination {
        president_id: PlayerId,
        chancellor_id: PlayerId,
    },
    Vote {
        passed: bool,
        ballots: Vec<Ballot>,
    },
    Policy {
        policy: Policy,
        forced: bool,
    },
    Veto {
        accepted: bool,
    },
    Investigation {
        president_id: PlayerId,
        target_id: PlayerId,
    },
    SpecialElection {
        president_id: PlayerId,
        target_id: PlayerId,
    },
    PolicyPeek {
        president_id: PlayerId,
    },
    Execution {
        president_id: PlayerId,
        target_id: PlayerId,
    },
    Disconnect {
        player_id: PlayerId,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub ts: String,
    #[serde(flatten)]
    pub event: HistoryEvent,
}

/// Who a chat line is addressed to
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "ids", rename_all = "snake_case")]
pub enum ChatTarget {
    #[default]
    Global,
    PresidentOnly,
    ChancellorOnly,
    Players(Vec<PlayerId>),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatVisibility {
    Global,
    Limited,
    Private,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatEntry {
    pub from_id: PlayerId,
    pub from: String,
    pub text: String,
    pub to: ChatTarget,
    pub visibility: ChatVisibility,
    pub ts: String,
}
