use super::room::{generate_room_code, validate_name};
use super::{AppState, ClientHandle, RegistryError, Room, RoomPlayer};
use crate::game::Game;
use crate::knowledge::{pending_prompt, public_view, role_knowledge, tips_for};
use crate::protocol::ServerMessage;
use crate::types::*;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Seed for the `number`th game dealt under a fixed base seed. The first game
/// uses the base seed itself.
pub(crate) fn game_seed(base: u64, number: u64) -> u64 {
    base ^ number.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Seat assignment handed back to the client that created, joined or
/// reclaimed it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Joined {
    pub room_code: RoomCode,
    pub player_id: PlayerId,
    pub token: String,
    pub name: String,
    pub is_host: bool,
}

impl Joined {
    fn new(room: &Room, player_id: &str) -> Option<Self> {
        let player = room.player(player_id)?;
        Some(Self {
            room_code: room.code.clone(),
            player_id: player.id.clone(),
            token: player.token.clone(),
            name: player.name.clone(),
            is_host: room.is_host(player_id),
        })
    }
}

impl From<Joined> for ServerMessage {
    fn from(joined: Joined) -> Self {
        ServerMessage::RoomJoined {
            room_code: joined.room_code,
            player_id: joined.player_id,
            token: joined.token,
            name: joined.name,
            is_host: joined.is_host,
        }
    }
}

impl AppState {
    async fn ensure_unbound(&self, connection_id: &str) -> Result<(), RegistryError> {
        match self.session(connection_id).await {
            Some(_) => Err(RegistryError::AlreadyInRoom),
            None => Ok(()),
        }
    }

    /// Open a new room with the caller as host
    pub async fn create_room(&self, client: &ClientHandle, name: &str) -> Result<Joined, RegistryError> {
        let name = validate_name(name)?;
        self.ensure_unbound(&client.id).await?;

        let host = RoomPlayer::new(name, client.clone());
        let player_id = host.id.clone();

        let room = {
            let mut rooms = self.rooms.write().await;
            // Collisions are rare with 33M combinations; retry until free
            let code = loop {
                let code = generate_room_code();
                if !rooms.contains_key(&code) {
                    break code;
                }
            };
            let room = Arc::new(Mutex::new(Room::new(code.clone(), host)));
            rooms.insert(code, room.clone());
            room
        };

        let room = room.lock().await;
        self.bind_session(&client.id, &room.code, &player_id).await;
        tracing::info!("Room {} created by {}", room.code, player_id);
        room.broadcast_roster();

        Joined::new(&room, &player_id).ok_or(RegistryError::UnknownPlayer(player_id))
    }

    /// Take a seat in an existing lobby
    pub async fn join_room(
        &self,
        client: &ClientHandle,
        code: &str,
        name: &str,
    ) -> Result<Joined, RegistryError> {
        let name = validate_name(name)?;
        self.ensure_unbound(&client.id).await?;

        let code = code.trim().to_uppercase();
        let room = self
            .get_room(&code)
            .await
            .ok_or_else(|| RegistryError::RoomNotFound(code.clone()))?;
        let mut room = room.lock().await;

        // An empty room is being torn down
        if room.players.is_empty() {
            return Err(RegistryError::RoomNotFound(code));
        }
        if room.game_active() {
            return Err(RegistryError::GameInProgress);
        }
        if room.players.len() >= MAX_PLAYERS {
            return Err(RegistryError::RoomFull);
        }

        let player = RoomPlayer::new(name, client.clone());
        let player_id = player.id.clone();
        room.players.push(player);
        self.bind_session(&client.id, &code, &player_id).await;
        tracing::info!("Player {} joined room {}", player_id, code);
        room.broadcast_roster();

        Joined::new(&room, &player_id).ok_or(RegistryError::UnknownPlayer(player_id))
    }

    /// Reclaim a seat by identity. Game state is untouched; the player gets
    /// their knowledge and owed prompt again.
    pub async fn reconnect(
        &self,
        client: &ClientHandle,
        code: &str,
        player_id: &str,
        token: &str,
    ) -> Result<Joined, RegistryError> {
        let code = code.trim().to_uppercase();
        if let Some(session) = self.session(&client.id).await {
            if session.room_code != code || session.player_id != player_id {
                return Err(RegistryError::AlreadyInRoom);
            }
        }

        let room = self
            .get_room(&code)
            .await
            .ok_or_else(|| RegistryError::RoomNotFound(code.clone()))?;
        let mut room = room.lock().await;

        let player = room
            .player_mut(player_id)
            .filter(|p| p.token == token)
            .ok_or_else(|| RegistryError::UnknownPlayer(player_id.to_string()))?;
        let previous = player.connection.replace(client.clone());

        let resumed = room.cancel_disconnect_timer(player_id);
        if let Some(previous) = previous.filter(|c| c.id != client.id) {
            self.unbind_session(&previous.id).await;
        }
        self.bind_session(&client.id, &code, player_id).await;
        tracing::info!(
            "Player {} reconnected to room {} (grace timer cancelled: {})",
            player_id,
            code,
            resumed
        );

        room.broadcast(&ServerMessage::PlayerReconnected {
            player_id: player_id.to_string(),
        });
        room.broadcast_roster();
        room.deliver_private_state(player_id);
        room.replay_chat(player_id);

        Joined::new(&room, player_id).ok_or_else(|| RegistryError::UnknownPlayer(player_id.to_string()))
    }

    /// Explicitly give up a seat. In a running game this counts as a
    /// disconnect without grace.
    pub async fn leave_room(&self, connection_id: &str) -> Result<(), RegistryError> {
        let session = self
            .unbind_session(connection_id)
            .await
            .ok_or(RegistryError::NotInRoom)?;
        let Some(room) = self.get_room(&session.room_code).await else {
            return Ok(());
        };

        let mut room = room.lock().await;
        room.depart(&session.player_id);
        tracing::info!("Player {} left room {}", session.player_id, session.room_code);
        let empty = room.players.is_empty();
        drop(room);

        if empty {
            self.destroy_room_if_empty(&session.room_code).await;
        }
        Ok(())
    }

    /// Host deals a new game to everyone on the roster
    pub async fn start_game(&self, connection_id: &str) -> Result<(), RegistryError> {
        let (room, player_id) = self.room_for(connection_id).await?;
        let mut room = room.lock().await;

        if room.player(&player_id).is_none() {
            return Err(RegistryError::NotInRoom);
        }
        if !room.is_host(&player_id) {
            return Err(RegistryError::NotHost("start the game"));
        }
        if room.game_active() {
            return Err(RegistryError::GameInProgress);
        }
        // Seats still held from the last game are released before dealing
        if room.release_dropped_seats() > 0 {
            room.broadcast_roster();
        }
        let count = room.players.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
            return Err(RegistryError::WrongPlayerCount(count));
        }

        let seats = room
            .players
            .iter()
            .map(|p| (p.id.clone(), p.name.clone()))
            .collect();
        let game = match self.config.game_seed {
            Some(seed) => {
                let number = self.games_started.fetch_add(1, Ordering::Relaxed);
                Game::with_seed(seats, game_seed(seed, number))
            }
            None => Game::new(seats),
        }
        .map_err(|rejection| {
            tracing::warn!("Room {}: could not start game: {}", room.code, rejection);
            RegistryError::WrongPlayerCount(count)
        })?;

        tracing::info!("Room {}: game started with {} players", room.code, count);
        room.broadcast(&ServerMessage::GameStarted {
            view: public_view(&game),
        });
        for player in &room.players {
            let Some(conn) = &player.connection else {
                continue;
            };
            if let Some(knowledge) = role_knowledge(&game, &player.id) {
                conn.send(ServerMessage::RoleAssignment { knowledge });
            }
            if let Some(prompt) = pending_prompt(&game, &player.id) {
                conn.send(ServerMessage::Prompt {
                    prompt: Some(prompt),
                });
            }
            conn.send(ServerMessage::Tips {
                tips: tips_for(&game, &player.id),
            });
        }
        room.game = Some(game);
        room.broadcast_roster();

        Ok(())
    }

    /// Host discards the current game and returns the room to the lobby
    pub async fn reset_game(&self, connection_id: &str) -> Result<(), RegistryError> {
        let (room, player_id) = self.room_for(connection_id).await?;
        let mut room = room.lock().await;

        if !room.is_host(&player_id) {
            return Err(RegistryError::NotHost("reset the game"));
        }
        if room.game.take().is_none() {
            return Err(RegistryError::NoActiveGame);
        }
        room.cancel_all_timers();
        room.release_dropped_seats();

        tracing::info!("Room {}: game reset", room.code);
        room.broadcast(&ServerMessage::GameReset {
            room_code: room.code.clone(),
        });
        room.broadcast_roster();
        Ok(())
    }
}
