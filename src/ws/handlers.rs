//! WebSocket message dispatch
//!
//! This module provides the main entry point for handling client messages.
//! Seat and host checks live in the registry; this layer only routes.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::{AppState, ClientHandle};
use std::sync::Arc;

use super::{game, lobby};

/// Handle client messages and return optional response
pub async fn handle_message(
    msg: ClientMessage,
    client: &ClientHandle,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match msg {
        // Room membership
        ClientMessage::CreateRoom { name } => lobby::handle_create_room(state, client, name).await,

        ClientMessage::JoinRoom { room_code, name } => {
            lobby::handle_join_room(state, client, room_code, name).await
        }

        ClientMessage::Reconnect {
            room_code,
            player_id,
            token,
        } => lobby::handle_reconnect(state, client, room_code, player_id, token).await,

        ClientMessage::LeaveRoom => lobby::handle_leave_room(state, client).await,

        // Host commands
        ClientMessage::StartGame => lobby::handle_start_game(state, client).await,

        ClientMessage::ResetGame => lobby::handle_reset_game(state, client).await,

        // Game actions
        ClientMessage::Nominate { chancellor_id } => {
            game::handle_nominate(state, client, chancellor_id).await
        }

        ClientMessage::CastVote { ja } => game::handle_cast_vote(state, client, ja).await,

        ClientMessage::DiscardPolicy { policy } => {
            game::handle_discard_policy(state, client, policy).await
        }

        ClientMessage::RequestVeto => game::handle_request_veto(state, client).await,

        ClientMessage::VetoDecision { accept } => {
            game::handle_veto_decision(state, client, accept).await
        }

        ClientMessage::UsePower { target_id } => {
            game::handle_use_power(state, client, target_id).await
        }

        ClientMessage::Chat { text, to } => lobby::handle_chat(state, client, text, to).await,
    }
}
