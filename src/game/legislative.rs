use super::{Game, GameResult, PolicyChoice, PolicyHand, PolicyOutcome, Rejection, VetoOutcome};
use crate::types::{GamePhase, HistoryEvent, PolicyStep};

impl Game {
    /// A legislator discards a card, or the chancellor asks for a veto.
    ///
    /// President discards one of three and passes two to the chancellor. The
    /// chancellor discards one and the other is enacted.
    pub fn handle_policy_choice(
        &mut self,
        actor_id: &str,
        choice: PolicyChoice,
    ) -> GameResult<PolicyOutcome> {
        self.require_phase(GamePhase::Policy)?;
        let step = self.policy_step().ok_or(Rejection::WrongPhase {
            expected: GamePhase::Policy,
            actual: self.phase,
        })?;

        let president_id = self.president_id().clone();
        let chancellor_id = self
            .chancellor()
            .map(|c| c.id.clone())
            .ok_or(Rejection::NotYourTurn)?;
        let veto_unlocked = self.veto_unlocked();

        match step {
            PolicyStep::President => {
                if president_id != actor_id {
                    return Err(Rejection::NotYourTurn);
                }
                let PolicyChoice::Discard(policy) = choice else {
                    return Err(Rejection::WrongStep(step));
                };
                let Some(session) = self.legislative.as_mut() else {
                    return Err(Rejection::WrongStep(step));
                };
                let pos = session
                    .hand
                    .iter()
                    .position(|p| *p == policy)
                    .ok_or(Rejection::PolicyNotInHand)?;
                session.hand.remove(pos);
                session.step = PolicyStep::Chancellor;
                let remaining = session.hand.clone();
                self.deck.discard(policy);

                Ok(PolicyOutcome::PassedToChancellor(PolicyHand {
                    player_id: chancellor_id,
                    policies: remaining,
                    veto_allowed: veto_unlocked,
                }))
            }
            PolicyStep::Chancellor => {
                if chancellor_id != actor_id {
                    return Err(Rejection::NotYourTurn);
                }
                match choice {
                    PolicyChoice::Veto => {
                        if !veto_unlocked {
                            return Err(Rejection::VetoLocked);
                        }
                        if let Some(session) = self.legislative.as_mut() {
                            session.step = PolicyStep::Veto;
                        }
                        tracing::debug!("Chancellor {} requested a veto", chancellor_id);
                        Ok(PolicyOutcome::VetoRequested {
                            president_id,
                            chancellor_id,
                        })
                    }
                    PolicyChoice::Discard(policy) => {
                        let Some(session) = self.legislative.as_mut() else {
                            return Err(Rejection::WrongStep(step));
                        };
                        let pos = session
                            .hand
                            .iter()
                            .position(|p| *p == policy)
                            .ok_or(Rejection::PolicyNotInHand)?;
                        session.hand.remove(pos);
                        let Some(enacted) = session.hand.pop() else {
                            return Err(Rejection::PolicyNotInHand);
                        };
                        self.legislative = None;
                        self.deck.discard(policy);

                        Ok(PolicyOutcome::Enacted(self.process_policy(enacted, true)))
                    }
                }
            }
            PolicyStep::Veto => Err(Rejection::WrongStep(step)),
        }
    }

    /// President answers a veto request. Accepting discards both cards and
    /// counts as a failed government; rejecting sends the chancellor back to
    /// the same two cards.
    pub fn handle_veto_decision(&mut self, actor_id: &str, accept: bool) -> GameResult<VetoOutcome> {
        self.require_phase(GamePhase::Policy)?;
        match self.policy_step() {
            Some(PolicyStep::Veto) => {}
            Some(step) => return Err(Rejection::WrongStep(step)),
            None => {
                return Err(Rejection::WrongPhase {
                    expected: GamePhase::Policy,
                    actual: self.phase,
                })
            }
        }
        if self.president_id() != actor_id {
            return Err(Rejection::NotYourTurn);
        }

        self.record(HistoryEvent::Veto { accepted: accept });

        if accept {
            tracing::debug!("Veto accepted by {}", actor_id);
            if let Some(session) = self.legislative.take() {
                for card in session.hand {
                    self.deck.discard(card);
                }
            }
            return Ok(VetoOutcome::Accepted(self.fail_government()));
        }

        let chancellor_id = self.chancellor().map(|c| c.id.clone()).unwrap_or_default();
        let policies = match self.legislative.as_mut() {
            Some(session) => {
                session.step = PolicyStep::Chancellor;
                session.hand.clone()
            }
            None => Vec::new(),
        };
        Ok(VetoOutcome::Rejected(PolicyHand {
            player_id: chancellor_id,
            policies,
            veto_allowed: true,
        }))
    }
}
