//! Session registry: rooms, their games and the connections bound to them
//!
//! Lock order is rooms map, then a room's mutex, then the sessions map. The
//! rooms map guard is never held across an await on a room except when
//! destroying an empty room.

mod disconnect;
mod error;
mod fanout;
mod lobby;
mod play;
mod room;

pub use disconnect::DisconnectTimer;
pub use error::{ActionError, RegistryError};
pub use lobby::Joined;
pub use room::{Room, RoomPlayer, Turn, CODE_LENGTH};

use crate::abuse::AbuseConfig;
use crate::config::ServerConfig;
use crate::protocol::ServerMessage;
use crate::types::*;
use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, RwLock};

/// Outbound side of one client connection
#[derive(Debug, Clone)]
pub struct ClientHandle {
    pub id: ConnectionId,
    tx: mpsc::UnboundedSender<ServerMessage>,
}

impl ClientHandle {
    pub fn new(tx: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            tx,
        }
    }

    /// Queue a message; false once the socket task has gone away
    pub fn send(&self, msg: ServerMessage) -> bool {
        self.tx.send(msg).is_ok()
    }
}

/// The seat a connection currently speaks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub room_code: RoomCode,
    pub player_id: PlayerId,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<RwLock<HashMap<RoomCode, Arc<Mutex<Room>>>>>,
    pub sessions: Arc<RwLock<HashMap<ConnectionId, Session>>>,
    pub config: ServerConfig,
    pub abuse: AbuseConfig,
    /// Games dealt since startup, mixed into the configured seed
    pub games_started: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(config: ServerConfig, abuse: AbuseConfig) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config,
            abuse,
            games_started: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn get_room(&self, code: &str) -> Option<Arc<Mutex<Room>>> {
        self.rooms.read().await.get(code).cloned()
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn session(&self, connection_id: &str) -> Option<Session> {
        self.sessions.read().await.get(connection_id).cloned()
    }

    pub(crate) async fn bind_session(&self, connection_id: &str, room_code: &str, player_id: &str) {
        self.sessions.write().await.insert(
            connection_id.to_string(),
            Session {
                room_code: room_code.to_string(),
                player_id: player_id.to_string(),
            },
        );
    }

    pub(crate) async fn unbind_session(&self, connection_id: &str) -> Option<Session> {
        self.sessions.write().await.remove(connection_id)
    }

    /// Resolve the room and stable player id behind a connection
    pub async fn room_for(
        &self,
        connection_id: &str,
    ) -> Result<(Arc<Mutex<Room>>, PlayerId), RegistryError> {
        let session = self
            .session(connection_id)
            .await
            .ok_or(RegistryError::NotInRoom)?;
        let room = self
            .get_room(&session.room_code)
            .await
            .ok_or(RegistryError::RoomNotFound(session.room_code))?;
        Ok((room, session.player_id))
    }

    /// Remove a room once its roster is empty. Re-checks under the map lock
    /// so a concurrent join is never lost.
    pub(crate) async fn destroy_room_if_empty(&self, code: &str) {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms.get(code).cloned() else {
            return;
        };
        let mut room = room.lock().await;
        if room.players.is_empty() {
            room.cancel_all_timers();
            rooms.remove(code);
            tracing::info!("Room {} destroyed", code);
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ServerConfig::default(), AbuseConfig::default())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tokio::sync::mpsc::UnboundedReceiver;

    pub fn client() -> (ClientHandle, UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ClientHandle::new(tx), rx)
    }

    pub fn drain(rx: &mut UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    /// A room with `count` joined players; index 0 is the host
    pub async fn lobby(
        state: &AppState,
        count: usize,
    ) -> (RoomCode, Vec<(ClientHandle, UnboundedReceiver<ServerMessage>, Joined)>) {
        let mut members = Vec::new();
        let (host, host_rx) = client();
        let joined = state.create_room(&host, "P0").await.unwrap();
        let code = joined.room_code.clone();
        members.push((host, host_rx, joined));
        for i in 1..count {
            let (c, rx) = client();
            let joined = state.join_room(&c, &code, &format!("P{i}")).await.unwrap();
            members.push((c, rx, joined));
        }
        (code, members)
    }
}
