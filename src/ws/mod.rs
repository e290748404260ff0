pub mod game;
pub mod handlers;
pub mod lobby;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::protocol::{ClientMessage, ServerMessage, PROTOCOL_VERSION};
use crate::state::{AppState, ClientHandle};

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

fn encode(msg: &ServerMessage) -> Option<Message> {
    match serde_json::to_string(msg) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            tracing::error!("Failed to serialize server message: {}", e);
            None
        }
    }
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let client = ClientHandle::new(tx);

    tracing::info!("WebSocket connected: {}", client.id);

    let welcome = ServerMessage::Welcome {
        protocol: PROTOCOL_VERSION.to_string(),
        connection_id: client.id.clone(),
        server_now: chrono::Utc::now().to_rfc3339(),
    };
    if let Some(msg) = encode(&welcome) {
        if sender.send(msg).await.is_err() {
            tracing::error!("Failed to send welcome message");
            return;
        }
    }

    loop {
        tokio::select! {
            // Room events queued for this client
            outbound = rx.recv() => {
                let Some(msg) = outbound else { break };
                if let Some(frame) = encode(&msg) {
                    if sender.send(frame).await.is_err() {
                        break;
                    }
                }
            }

            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message from {}: {}", client.id, text);

                        let allowed = match &state.abuse.rate_limiter {
                            Some(limiter) => limiter.check(&client.id).await,
                            None => true,
                        };
                        let response = if !allowed {
                            tracing::warn!("Rate limited connection {}", client.id);
                            Some(ServerMessage::error(
                                "RATE_LIMITED",
                                "Too many messages. Please slow down.",
                            ))
                        } else {
                            match serde_json::from_str::<ClientMessage>(&text) {
                                Ok(client_msg) => {
                                    handlers::handle_message(client_msg, &client, &state).await
                                }
                                Err(e) => {
                                    tracing::warn!("Failed to parse client message: {}", e);
                                    Some(ServerMessage::error(
                                        "PARSE_ERROR",
                                        format!("Invalid message format: {}", e),
                                    ))
                                }
                            }
                        };

                        if let Some(frame) = response.as_ref().and_then(encode) {
                            if sender.send(frame).await.is_err() {
                                tracing::error!("Failed to send response");
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed by {}", client.id);
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    state.connection_lost(&client.id).await;
    tracing::info!("WebSocket connection closed: {}", client.id);
}
