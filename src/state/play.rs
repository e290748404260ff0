use super::{ActionError, AppState, RegistryError, Room};
use crate::chat;
use crate::game::{Game, GameResult};
use crate::protocol::ServerMessage;
use crate::types::*;

impl AppState {
    /// Run one game action for the player behind `connection_id`.
    ///
    /// The room stays locked from validation through fan-out: `announce`
    /// publishes the action's own events, then every player gets the new
    /// board and any prompt that changed.
    pub async fn play<T>(
        &self,
        connection_id: &str,
        action: impl FnOnce(&mut Game, &PlayerId) -> GameResult<T>,
        announce: impl FnOnce(&Room, &T),
    ) -> Result<T, ActionError> {
        let (room, player_id) = self.room_for(connection_id).await?;
        let mut room = room.lock().await;
        if room.player(&player_id).is_none() {
            return Err(RegistryError::NotInRoom.into());
        }

        let turn = room.begin_turn()?;
        let game = room.game.as_mut().ok_or(RegistryError::NoActiveGame)?;
        let outcome = action(game, &player_id)?;

        announce(&*room, &outcome);
        room.finish_turn(turn);
        Ok(outcome)
    }

    /// Relay a chat line to its audience and keep it in the room log
    pub async fn post_chat(
        &self,
        connection_id: &str,
        text: &str,
        to: ChatTarget,
    ) -> Result<(), RegistryError> {
        let (room, player_id) = self.room_for(connection_id).await?;
        let mut room = room.lock().await;
        let from = room
            .player(&player_id)
            .map(|p| p.name.clone())
            .ok_or(RegistryError::NotInRoom)?;

        let text = chat::sanitize_message(text).ok_or(RegistryError::EmptyMessage)?;
        let recipients = chat::recipients(&room.roster_ids(), room.game.as_ref(), &player_id, &to)
            .ok_or(RegistryError::NoActiveGame)?;

        let entry = ChatEntry {
            from_id: player_id,
            from,
            text,
            visibility: chat::visibility(&to),
            to,
            ts: chrono::Utc::now().to_rfc3339(),
        };
        room.chat_log.push(entry.clone());
        for id in &recipients {
            room.send_to(id, ServerMessage::Chat {
                entry: entry.clone(),
            });
        }
        Ok(())
    }
}
