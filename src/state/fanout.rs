//! Outbound delivery for a room
//!
//! Every message leaves through a player's [`ClientHandle`] while the room
//! lock is held, so a room's messages reach each client in mutation order.

use super::room::{Room, Turn};
use crate::game::{DisconnectOutcome, Enactment, PowerOutcome, PowerResult, TrackerAdvance, VoteResolution};
use crate::knowledge::{pending_prompt, public_view, role_knowledge, tips_for, KnownPlayer};
use crate::protocol::ServerMessage;

impl Room {
    /// Send to one player if they are connected
    pub fn send_to(&self, player_id: &str, msg: ServerMessage) {
        if let Some(conn) = self.player(player_id).and_then(|p| p.connection.as_ref()) {
            conn.send(msg);
        }
    }

    /// Send to every connected player
    pub fn broadcast(&self, msg: &ServerMessage) {
        for conn in self.players.iter().filter_map(|p| p.connection.as_ref()) {
            conn.send(msg.clone());
        }
    }

    pub fn broadcast_roster(&self) {
        self.broadcast(&ServerMessage::RoomUpdate {
            room_code: self.code.clone(),
            host_id: self.host_id.clone(),
            players: self.lobby_players(),
            in_game: self.game_active(),
        });
    }

    pub fn broadcast_state(&self) {
        if let Some(game) = &self.game {
            self.broadcast(&ServerMessage::GameState {
                view: public_view(game),
            });
        }
    }

    /// Close out an accepted action: public board, changed prompts and tips,
    /// then the role reveal when the game just ended.
    pub fn finish_turn(&self, turn: Turn) {
        let Some(game) = &self.game else {
            return;
        };
        self.broadcast_state();

        for (player_id, prompt) in self.prompts(game) {
            let before = turn.prompts.get(&player_id).cloned().flatten();
            if before != prompt {
                self.send_to(&player_id, ServerMessage::Prompt { prompt });
            }
        }
        for (player_id, tips) in self.tips(game) {
            if turn.tips.get(&player_id) != Some(&tips) {
                self.send_to(&player_id, ServerMessage::Tips { tips });
            }
        }

        if let (false, Some(over)) = (turn.was_over, game.game_over) {
            let roles = game
                .players
                .iter()
                .map(|p| KnownPlayer {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    role: p.role,
                })
                .collect();
            self.broadcast(&ServerMessage::GameOver {
                winner: over.winner,
                reason: over.reason,
                roles,
            });
        }
    }

    /// Everything a player needs to resume: role knowledge, board and the
    /// action they owe.
    pub fn deliver_private_state(&self, player_id: &str) {
        let Some(game) = &self.game else {
            return;
        };
        if let Some(knowledge) = role_knowledge(game, player_id) {
            self.send_to(player_id, ServerMessage::RoleAssignment { knowledge });
        }
        self.send_to(
            player_id,
            ServerMessage::GameState {
                view: public_view(game),
            },
        );
        if let Some(prompt) = pending_prompt(game, player_id) {
            self.send_to(
                player_id,
                ServerMessage::Prompt {
                    prompt: Some(prompt),
                },
            );
        }
        self.send_to(
            player_id,
            ServerMessage::Tips {
                tips: tips_for(game, player_id),
            },
        );
    }

    /// Resend the chat lines a returning player was entitled to
    pub fn replay_chat(&self, player_id: &str) {
        for entry in self.chat_log.visible_to(player_id) {
            self.send_to(
                player_id,
                ServerMessage::Chat {
                    entry: entry.clone(),
                },
            );
        }
    }

    pub fn announce_vote(&self, resolution: &VoteResolution) {
        let failed_elections = match &resolution.tracker {
            Some(tracker) => tracker.reached(),
            None => self.game.as_ref().map_or(0, |g| g.failed_elections),
        };
        self.broadcast(&ServerMessage::VoteResult {
            president_id: resolution.president_id.clone(),
            chancellor_id: resolution.chancellor_id.clone(),
            passed: resolution.passed,
            ballots: resolution.ballots.clone(),
            failed_elections,
        });
        if let Some(tracker) = &resolution.tracker {
            self.announce_tracker(tracker);
        }
    }

    pub fn announce_tracker(&self, tracker: &TrackerAdvance) {
        if let Some(enactment) = &tracker.auto_enacted {
            self.announce_enactment(enactment);
        }
    }

    pub fn announce_enactment(&self, enactment: &Enactment) {
        let enacted = self.game.as_ref().map(|g| g.enacted).unwrap_or_default();
        self.broadcast(&ServerMessage::PolicyEnacted {
            policy: enactment.policy,
            forced: enactment.forced,
            enacted,
        });
    }

    /// Public result to the table, private details to the acting president
    pub fn announce_power(&self, result: &PowerResult) {
        self.broadcast(&ServerMessage::PowerResult {
            president_id: result.president_id.clone(),
            power: result.outcome.power(),
            target_id: result.outcome.target_id().cloned(),
        });
        match &result.outcome {
            PowerOutcome::Investigated { target_id, party } => self.send_to(
                &result.president_id,
                ServerMessage::InvestigationResult {
                    target_id: target_id.clone(),
                    party: *party,
                },
            ),
            PowerOutcome::PolicyPeek { policies } => self.send_to(
                &result.president_id,
                ServerMessage::PolicyPeek {
                    policies: policies.clone(),
                },
            ),
            PowerOutcome::SpecialElection { .. } | PowerOutcome::Executed { .. } => {}
        }
    }

    pub fn announce_departure(&self, outcome: &DisconnectOutcome) {
        match outcome {
            DisconnectOutcome::VoteResolved(resolution) => self.announce_vote(resolution),
            DisconnectOutcome::GovernmentCollapsed(tracker) => self.announce_tracker(tracker),
            DisconnectOutcome::Uninvolved | DisconnectOutcome::GameOver(_) => {}
        }
    }

    /// Apply the game's disconnect rules for a player who is gone for good.
    /// No-op outside a running game.
    pub(crate) fn apply_departure(&mut self, player_id: &str) {
        if !self.game_active() {
            return;
        }
        let Ok(turn) = self.begin_turn() else {
            return;
        };
        let Some(game) = self.game.as_mut() else {
            return;
        };
        match game.handle_disconnect(player_id) {
            Ok(outcome) => {
                tracing::info!("Room {}: {} removed from the game", self.code, player_id);
                self.announce_departure(&outcome);
                self.finish_turn(turn);
            }
            Err(rejection) => {
                tracing::debug!("Room {}: departure of {} ignored: {}", self.code, player_id, rejection);
            }
        }
    }
}
