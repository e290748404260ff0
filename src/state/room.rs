use super::{ClientHandle, DisconnectTimer, RegistryError};
use crate::chat::ChatLog;
use crate::game::Game;
use crate::knowledge::{pending_prompt, tips_for, Prompt};
use crate::protocol::LobbyPlayer;
use crate::types::*;
use rand::Rng;
use std::collections::HashMap;

/// Safe character set for room codes (excludes 0/O and 1/I to avoid confusion)
const CODE_CHARS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const CODE_LENGTH: usize = 5;
const MAX_NAME_CHARS: usize = 24;

/// Generate a random room code (5 characters)
pub(crate) fn generate_room_code() -> RoomCode {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

/// Trimmed display name, or an error when empty or too long
pub(crate) fn validate_name(name: &str) -> Result<String, RegistryError> {
    let name = name.trim();
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_CHARS {
        return Err(RegistryError::InvalidName);
    }
    Ok(name.to_string())
}

#[derive(Debug)]
pub struct RoomPlayer {
    pub id: PlayerId,
    pub name: String,
    /// Secret handed out at join, required to reclaim the seat
    pub token: String,
    /// `None` while disconnected inside the grace period
    pub connection: Option<ClientHandle>,
}

impl RoomPlayer {
    pub fn new(name: String, connection: ClientHandle) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            name,
            token: ulid::Ulid::new().to_string(),
            connection: Some(connection),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }
}

/// One lobby and, once started, its game. Always accessed behind the room's
/// mutex, so every mutation of a room is serialized.
#[derive(Debug)]
pub struct Room {
    pub code: RoomCode,
    pub players: Vec<RoomPlayer>,
    pub host_id: Option<PlayerId>,
    pub game: Option<Game>,
    pub chat_log: ChatLog,
    pub(crate) disconnect_timers: HashMap<PlayerId, DisconnectTimer>,
    pub(crate) timer_generation: u64,
}

/// Prompts and tips before an action, compared against the ones after it
#[derive(Debug)]
pub struct Turn {
    pub(crate) prompts: HashMap<PlayerId, Option<Prompt>>,
    pub(crate) tips: HashMap<PlayerId, Vec<String>>,
    pub(crate) was_over: bool,
}

impl Room {
    pub fn new(code: RoomCode, host: RoomPlayer) -> Self {
        Self {
            code,
            host_id: Some(host.id.clone()),
            players: vec![host],
            game: None,
            chat_log: ChatLog::default(),
            disconnect_timers: HashMap::new(),
            timer_generation: 0,
        }
    }

    pub fn player(&self, player_id: &str) -> Option<&RoomPlayer> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn player_mut(&mut self, player_id: &str) -> Option<&mut RoomPlayer> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    pub fn is_host(&self, player_id: &str) -> bool {
        self.host_id.as_deref() == Some(player_id)
    }

    /// A game exists and has not reached game over
    pub fn game_active(&self) -> bool {
        self.game.as_ref().is_some_and(|g| !g.is_over())
    }

    pub fn roster_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id.clone()).collect()
    }

    pub fn lobby_players(&self) -> Vec<LobbyPlayer> {
        self.players
            .iter()
            .map(|p| LobbyPlayer {
                id: p.id.clone(),
                name: p.name.clone(),
                connected: p.is_connected(),
                is_host: self.is_host(&p.id),
            })
            .collect()
    }

    /// Drop a player from the roster, cancelling their grace timer and
    /// migrating the host seat if needed. Returns whether they were present.
    pub fn remove_player(&mut self, player_id: &str) -> bool {
        self.cancel_disconnect_timer(player_id);
        let before = self.players.len();
        self.players.retain(|p| p.id != player_id);
        if self.players.len() == before {
            return false;
        }
        if self.is_host(player_id) {
            self.host_id = self.players.first().map(|p| p.id.clone());
            if let Some(host) = &self.host_id {
                tracing::info!("Room {}: host passed to {}", self.code, host);
            }
        }
        true
    }

    pub(crate) fn cancel_disconnect_timer(&mut self, player_id: &str) -> bool {
        match self.disconnect_timers.remove(player_id) {
            Some(timer) => {
                timer.handle.abort();
                true
            }
            None => false,
        }
    }

    pub(crate) fn cancel_all_timers(&mut self) {
        for (_, timer) in self.disconnect_timers.drain() {
            timer.handle.abort();
        }
    }

    /// Snapshot owed prompts before mutating the game
    pub fn begin_turn(&self) -> Result<Turn, RegistryError> {
        let game = self.game.as_ref().ok_or(RegistryError::NoActiveGame)?;
        Ok(Turn {
            prompts: self.prompts(game),
            tips: self.tips(game),
            was_over: game.is_over(),
        })
    }

    pub(crate) fn prompts(&self, game: &Game) -> HashMap<PlayerId, Option<Prompt>> {
        self.players
            .iter()
            .map(|p| (p.id.clone(), pending_prompt(game, &p.id)))
            .collect()
    }

    pub(crate) fn tips(&self, game: &Game) -> HashMap<PlayerId, Vec<String>> {
        self.players
            .iter()
            .map(|p| (p.id.clone(), tips_for(game, &p.id)))
            .collect()
    }
}
