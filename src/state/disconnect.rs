//! Dropped connections and the per-seat grace timer
//!
//! A seat in a running game survives its connection for the configured grace
//! period. Each timer carries a generation; a firing timer only acts if its
//! generation is still the one registered for the seat, which makes the
//! reconnect/expiry race harmless under the room lock.

use super::{AppState, Room};
use crate::protocol::ServerMessage;
use crate::types::PlayerId;
use tokio::task::JoinHandle;

#[derive(Debug)]
pub struct DisconnectTimer {
    pub(crate) generation: u64,
    pub(crate) handle: JoinHandle<()>,
}

impl Room {
    /// Remove a player for good: game disconnect rules first, then the roster
    pub(crate) fn depart(&mut self, player_id: &str) -> bool {
        self.cancel_disconnect_timer(player_id);
        let Some(player) = self.player_mut(player_id) else {
            return false;
        };
        player.connection = None;

        self.apply_departure(player_id);
        self.remove_player(player_id);
        self.broadcast(&ServerMessage::PlayerLeft {
            player_id: player_id.to_string(),
        });
        self.broadcast_roster();
        true
    }

    /// Free every seat still waiting on a reconnect. Returns how many went.
    pub(crate) fn release_dropped_seats(&mut self) -> usize {
        let dropped: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|p| !p.is_connected())
            .map(|p| p.id.clone())
            .collect();
        for id in &dropped {
            self.remove_player(id);
            self.broadcast(&ServerMessage::PlayerLeft {
                player_id: id.clone(),
            });
        }
        dropped.len()
    }
}

impl AppState {
    /// The socket behind `connection_id` closed
    pub async fn connection_lost(&self, connection_id: &str) {
        if let Some(limiter) = &self.abuse.rate_limiter {
            limiter.forget(connection_id).await;
        }
        let Some(session) = self.unbind_session(connection_id).await else {
            return;
        };
        let Some(room) = self.get_room(&session.room_code).await else {
            return;
        };
        let mut room = room.lock().await;
        let player_id = session.player_id;

        let Some(player) = room.player_mut(&player_id) else {
            return;
        };
        // Seat was already reclaimed by a newer connection
        if player.connection.as_ref().map(|c| c.id.as_str()) != Some(connection_id) {
            return;
        }
        player.connection = None;

        if room.game_active() {
            self.start_grace_timer(&mut room, &player_id);
            room.broadcast(&ServerMessage::PlayerDisconnected {
                player_id,
                grace_secs: Some(self.config.disconnect_grace.as_secs()),
            });
            room.broadcast_roster();
            return;
        }

        tracing::info!("Player {} dropped from lobby {}", player_id, room.code);
        room.depart(&player_id);
        let empty = room.players.is_empty();
        let code = room.code.clone();
        drop(room);
        if empty {
            self.destroy_room_if_empty(&code).await;
        }
    }

    fn start_grace_timer(&self, room: &mut Room, player_id: &str) {
        room.timer_generation += 1;
        let generation = room.timer_generation;
        let grace = self.config.disconnect_grace;

        let state = self.clone();
        let code = room.code.clone();
        let seat = player_id.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            state.expire_grace(&code, &seat, generation).await;
        });

        let timer = DisconnectTimer { generation, handle };
        if let Some(previous) = room.disconnect_timers.insert(player_id.to_string(), timer) {
            previous.handle.abort();
        }
        tracing::info!(
            "Room {}: {} disconnected, holding seat for {}s",
            room.code,
            player_id,
            grace.as_secs()
        );
    }

    /// Grace period ran out without a reconnect
    async fn expire_grace(&self, code: &str, player_id: &str, generation: u64) {
        let Some(room) = self.get_room(code).await else {
            return;
        };
        let mut room = room.lock().await;
        match room.disconnect_timers.get(player_id) {
            Some(timer) if timer.generation == generation => {}
            _ => return,
        }
        // Detach rather than abort: this is the running timer task
        room.disconnect_timers.remove(player_id);

        tracing::info!("Room {}: grace period for {} expired", code, player_id);
        room.depart(player_id);
        let empty = room.players.is_empty();
        drop(room);
        if empty {
            self.destroy_room_if_empty(code).await;
        }
    }
}
