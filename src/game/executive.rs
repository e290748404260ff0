use super::{Game, GameResult, PowerOutcome, PowerResult, Rejection};
use crate::types::{GameOver, GamePhase, HistoryEvent, PlayerId, Power, Role, WinReason, Winner};

const PEEK_COUNT: usize = 3;

impl Game {
    /// The president named on the pending power uses it. Peek ignores the target.
    pub fn handle_power(&mut self, actor_id: &str, target_id: Option<&str>) -> GameResult<PowerResult> {
        self.require_phase(GamePhase::Power)?;
        let pending = self.pending_power.clone().ok_or(Rejection::WrongPhase {
            expected: GamePhase::Power,
            actual: self.phase,
        })?;
        if pending.president_id != actor_id {
            return Err(Rejection::NotYourTurn);
        }

        let outcome = match pending.power {
            Power::PolicyPeek => self.policy_peek(&pending.president_id),
            power => {
                let target = self.power_target(actor_id, target_id)?;
                match power {
                    Power::Investigate => self.investigate(&pending.president_id, target)?,
                    Power::SpecialElection => self.special_election(&pending.president_id, target),
                    _ => self.execute(&pending.president_id, target),
                }
            }
        };

        Ok(PowerResult {
            president_id: pending.president_id,
            outcome,
        })
    }

    /// Validate a power target: alive and someone other than the president
    fn power_target(&self, actor_id: &str, target_id: Option<&str>) -> GameResult<usize> {
        let target_id = target_id.ok_or(Rejection::MissingTarget)?;
        let seat = self
            .index_of(target_id)
            .ok_or_else(|| Rejection::UnknownPlayer(target_id.to_string()))?;
        let target = &self.players[seat];
        if !target.alive {
            return Err(Rejection::PlayerDead(target.id.clone()));
        }
        if target.id == actor_id {
            return Err(Rejection::InvalidTarget(target.id.clone()));
        }
        Ok(seat)
    }

    /// Players the pending power may be used on
    pub fn eligible_power_targets(&self) -> Vec<PlayerId> {
        let Some(pending) = &self.pending_power else {
            return Vec::new();
        };
        if !pending.power.needs_target() {
            return Vec::new();
        }
        self.players
            .iter()
            .filter(|p| p.alive && p.id != pending.president_id)
            .filter(|p| pending.power != Power::Investigate || !self.investigated_ids.contains(&p.id))
            .map(|p| p.id.clone())
            .collect()
    }

    fn close_power(&mut self) {
        self.pending_power = None;
        self.end_term();
    }

    fn investigate(&mut self, president_id: &PlayerId, seat: usize) -> GameResult<PowerOutcome> {
        let target = &self.players[seat];
        if self.investigated_ids.contains(&target.id) {
            return Err(Rejection::AlreadyInvestigated(target.id.clone()));
        }
        let target_id = target.id.clone();
        let party = target.role.party();

        self.investigated_ids.push(target_id.clone());
        self.record(HistoryEvent::Investigation {
            president_id: president_id.clone(),
            target_id: target_id.clone(),
        });
        self.close_power();

        Ok(PowerOutcome::Investigated { target_id, party })
    }

    /// Hand the presidency to `seat` for one term. Rotation resumes from the
    /// seat after the current president afterwards.
    fn special_election(&mut self, president_id: &PlayerId, seat: usize) -> PowerOutcome {
        let target_id = self.players[seat].id.clone();
        self.special_election_return_index = Some((self.president_index + 1) % self.players.len());
        self.president_index = seat;
        self.pending_power = None;
        self.phase = GamePhase::Nominate;
        self.record(HistoryEvent::SpecialElection {
            president_id: president_id.clone(),
            target_id: target_id.clone(),
        });

        PowerOutcome::SpecialElection { target_id }
    }

    fn policy_peek(&mut self, president_id: &PlayerId) -> PowerOutcome {
        let policies = self.deck.peek(PEEK_COUNT);
        self.record(HistoryEvent::PolicyPeek {
            president_id: president_id.clone(),
        });
        self.close_power();

        PowerOutcome::PolicyPeek { policies }
    }

    fn execute(&mut self, president_id: &PlayerId, seat: usize) -> PowerOutcome {
        let target = &mut self.players[seat];
        target.alive = false;
        target.has_voted = false;
        target.current_vote = None;
        let target_id = target.id.clone();
        let was_hitler = target.role == Role::Hitler;

        self.record(HistoryEvent::Execution {
            president_id: president_id.clone(),
            target_id: target_id.clone(),
        });

        if was_hitler {
            let over = GameOver::new(Winner::Liberals, WinReason::HitlerExecuted);
            self.finish(over);
            return PowerOutcome::Executed {
                target_id,
                game_over: Some(over),
            };
        }

        self.close_power();
        PowerOutcome::Executed {
            target_id,
            game_over: None,
        }
    }
}
