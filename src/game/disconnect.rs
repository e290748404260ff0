use super::{DisconnectOutcome, Game, GameResult, Rejection};
use crate::types::{GameOver, GamePhase, HistoryEvent, Role, WinReason, Winner};

impl Game {
    /// A player is gone for good. They die without their role being revealed.
    ///
    /// Losing Hitler hands the liberals the game. Losing the president, the
    /// chancellor or the president holding a power collapses the government
    /// as a failed election. Anyone else simply leaves the table, which may
    /// complete a pending vote.
    pub fn handle_disconnect(&mut self, player_id: &str) -> GameResult<DisconnectOutcome> {
        if self.is_over() {
            return Err(Rejection::GameFinished);
        }
        let seat = self
            .index_of(player_id)
            .ok_or_else(|| Rejection::UnknownPlayer(player_id.to_string()))?;
        let player = &mut self.players[seat];
        if !player.alive {
            return Err(Rejection::PlayerDead(player.id.clone()));
        }
        player.alive = false;
        player.has_voted = false;
        player.current_vote = None;
        let was_hitler = player.role == Role::Hitler;

        self.record(HistoryEvent::Disconnect {
            player_id: player_id.to_string(),
        });

        if was_hitler {
            let over = GameOver::new(Winner::Liberals, WinReason::HitlerExecuted);
            self.finish(over);
            return Ok(DisconnectOutcome::GameOver(over));
        }

        let held_power = self
            .pending_power
            .as_ref()
            .is_some_and(|p| p.president_id == player_id);
        let involved = seat == self.president_index || self.chancellor_index == Some(seat) || held_power;

        if involved {
            tracing::info!("Player {} left while in office, government collapses", player_id);
            return Ok(DisconnectOutcome::GovernmentCollapsed(self.fail_government()));
        }

        if self.phase == GamePhase::Vote && self.votes_outstanding() == 0 {
            return Ok(DisconnectOutcome::VoteResolved(self.resolve_vote()));
        }

        Ok(DisconnectOutcome::Uninvolved)
    }
}
