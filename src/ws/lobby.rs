//! Room membership handlers
//!
//! Create, join, reconnect and leave, plus the host-only start and reset.

use crate::protocol::ServerMessage;
use crate::state::{AppState, ClientHandle, Joined, RegistryError};
use crate::types::ChatTarget;
use std::sync::Arc;

fn seat_reply(result: Result<Joined, RegistryError>) -> Option<ServerMessage> {
    match result {
        Ok(joined) => Some(joined.into()),
        Err(e) => {
            tracing::info!("Seat request refused: {}", e);
            Some(e.into())
        }
    }
}

/// Successful room commands answer through broadcasts; only failures reply
fn ack(result: Result<(), RegistryError>) -> Option<ServerMessage> {
    match result {
        Ok(()) => None,
        Err(e) => {
            tracing::info!("Room command refused: {}", e);
            Some(e.into())
        }
    }
}

pub async fn handle_create_room(
    state: &Arc<AppState>,
    client: &ClientHandle,
    name: String,
) -> Option<ServerMessage> {
    tracing::info!("Create room request from {}: {}", client.id, name);
    seat_reply(state.create_room(client, &name).await)
}

pub async fn handle_join_room(
    state: &Arc<AppState>,
    client: &ClientHandle,
    room_code: String,
    name: String,
) -> Option<ServerMessage> {
    tracing::info!("Join request for room {} from {}", room_code, client.id);
    seat_reply(state.join_room(client, &room_code, &name).await)
}

pub async fn handle_reconnect(
    state: &Arc<AppState>,
    client: &ClientHandle,
    room_code: String,
    player_id: String,
    token: String,
) -> Option<ServerMessage> {
    tracing::info!("Reconnect request for {} in room {}", player_id, room_code);
    seat_reply(state.reconnect(client, &room_code, &player_id, &token).await)
}

pub async fn handle_leave_room(state: &Arc<AppState>, client: &ClientHandle) -> Option<ServerMessage> {
    ack(state.leave_room(&client.id).await)
}

pub async fn handle_start_game(state: &Arc<AppState>, client: &ClientHandle) -> Option<ServerMessage> {
    ack(state.start_game(&client.id).await)
}

pub async fn handle_reset_game(state: &Arc<AppState>, client: &ClientHandle) -> Option<ServerMessage> {
    ack(state.reset_game(&client.id).await)
}

pub async fn handle_chat(
    state: &Arc<AppState>,
    client: &ClientHandle,
    text: String,
    to: ChatTarget,
) -> Option<ServerMessage> {
    ack(state.post_chat(&client.id, &text, to).await)
}
