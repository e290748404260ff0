use crate::knowledge::{KnownPlayer, Prompt, PublicGameView, RoleKnowledge};
use crate::types::*;
use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom {
        name: String,
    },
    JoinRoom {
        room_code: RoomCode,
        name: String,
    },
    /// Resume a seat after a dropped connection
    Reconnect {
        room_code: RoomCode,
        player_id: PlayerId,
        token: String,
    },
    LeaveRoom,
    // Host-only messages
    StartGame,
    ResetGame,
    // Game actions
    Nominate {
        chancellor_id: PlayerId,
    },
    CastVote {
        ja: bool,
    },
    /// President or chancellor discards one card from their hand
    DiscardPolicy {
        policy: Policy,
    },
    RequestVeto,
    VetoDecision {
        accept: bool,
    },
    UsePower {
        #[serde(default)]
        target_id: Option<PlayerId>,
    },
    Chat {
        text: String,
        #[serde(default)]
        to: ChatTarget,
    },
}

/// Roster entry shown in the lobby
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LobbyPlayer {
    pub id: PlayerId,
    pub name: String,
    pub connected: bool,
    pub is_host: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        connection_id: ConnectionId,
        server_now: String,
    },
    /// Sent only to the joining client. `token` is required to reconnect.
    RoomJoined {
        room_code: RoomCode,
        player_id: PlayerId,
        token: String,
        name: String,
        is_host: bool,
    },
    RoomUpdate {
        room_code: RoomCode,
        host_id: Option<PlayerId>,
        players: Vec<LobbyPlayer>,
        in_game: bool,
    },
    GameStarted {
        view: PublicGameView,
    },
    RoleAssignment {
        knowledge: RoleKnowledge,
    },
    GameState {
        view: PublicGameView,
    },
    /// The action this client owes; `None` clears a previous prompt
    Prompt {
        prompt: Option<Prompt>,
    },
    /// Hints for the recipient's current situation, resent when they change
    Tips {
        tips: Vec<String>,
    },
    Nomination {
        president_id: PlayerId,
        chancellor_id: PlayerId,
    },
    VoteCast {
        player_id: PlayerId,
        waiting_on: usize,
    },
    VoteResult {
        president_id: PlayerId,
        chancellor_id: PlayerId,
        passed: bool,
        ballots: Vec<Ballot>,
        failed_elections: u8,
    },
    PolicyEnacted {
        policy: Policy,
        forced: bool,
        enacted: EnactedPolicies,
    },
    VetoRequested {
        president_id: PlayerId,
        chancellor_id: PlayerId,
    },
    VetoResult {
        accepted: bool,
    },
    PowerResult {
        president_id: PlayerId,
        power: Power,
        target_id: Option<PlayerId>,
    },
    /// Private to the investigating president
    InvestigationResult {
        target_id: PlayerId,
        party: Party,
    },
    /// Private to the peeking president; top card first
    PolicyPeek {
        policies: Vec<Policy>,
    },
    PlayerDisconnected {
        player_id: PlayerId,
        /// Seconds until the seat is given up, when a game is running
        grace_secs: Option<u64>,
    },
    PlayerReconnected {
        player_id: PlayerId,
    },
    PlayerLeft {
        player_id: PlayerId,
    },
    GameOver {
        winner: Winner,
        reason: WinReason,
        roles: Vec<KnownPlayer>,
    },
    GameReset {
        room_code: RoomCode,
    },
    Chat {
        entry: ChatEntry,
    },
    Error {
        code: String,
        msg: String,
    },
}

impl ServerMessage {
    pub fn error(code: &str, msg: impl Into<String>) -> Self {
        ServerMessage::Error {
            code: code.to_string(),
            msg: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_tags() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"discard_policy","policy":"FASCIST"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::DiscardPolicy {
                policy: Policy::Fascist
            }
        );

        let msg: ClientMessage = serde_json::from_str(r#"{"t":"use_power"}"#).unwrap();
        assert_eq!(msg, ClientMessage::UsePower { target_id: None });

        let msg: ClientMessage = serde_json::from_str(r#"{"t":"chat","text":"hi"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Chat {
                text: "hi".to_string(),
                to: ChatTarget::Global
            }
        );
    }

    #[test]
    fn test_game_over_payload_shape() {
        let msg = ServerMessage::GameOver {
            winner: Winner::Liberals,
            reason: WinReason::LiberalPolicies,
            roles: vec![],
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["t"], "game_over");
        assert_eq!(json["winner"], "LIBERALS");
        assert_eq!(json["reason"], "LIBERAL_POLICIES");
    }

    #[test]
    fn test_unknown_tag_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"t":"teleport"}"#).is_err());
    }
}
