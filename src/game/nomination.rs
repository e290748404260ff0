use super::{Game, GameResult, Nomination, Rejection, SMALL_TABLE_ALIVE};
use crate::types::{GamePhase, HistoryEvent, PlayerId};

impl Game {
    /// President proposes a chancellor; the table then votes on the pair
    pub fn nominate_chancellor(&mut self, actor_id: &str, nominee_id: &str) -> GameResult<Nomination> {
        self.require_phase(GamePhase::Nominate)?;
        if self.president_id() != actor_id {
            return Err(Rejection::NotYourTurn);
        }
        let nominee = self
            .index_of(nominee_id)
            .ok_or_else(|| Rejection::UnknownPlayer(nominee_id.to_string()))?;
        self.check_chancellor_eligibility(nominee)?;

        let nomination = Nomination {
            president_id: self.president_id().clone(),
            chancellor_id: self.players[nominee].id.clone(),
        };
        self.chancellor_index = Some(nominee);
        self.clear_votes();
        self.phase = GamePhase::Vote;
        self.record(HistoryEvent::Nomination {
            president_id: nomination.president_id.clone(),
            chancellor_id: nomination.chancellor_id.clone(),
        });

        Ok(nomination)
    }

    /// Term limits: never the last chancellor, and not the last president
    /// while more than five players are alive.
    fn check_chancellor_eligibility(&self, seat: usize) -> GameResult<()> {
        let candidate = &self.players[seat];
        if !candidate.alive {
            return Err(Rejection::PlayerDead(candidate.id.clone()));
        }
        if seat == self.president_index {
            return Err(Rejection::InvalidTarget(candidate.id.clone()));
        }
        if self.last_chancellor_id.as_ref() == Some(&candidate.id) {
            return Err(Rejection::TermLimited(candidate.id.clone()));
        }
        if self.alive_count() > SMALL_TABLE_ALIVE
            && self.last_president_id.as_ref() == Some(&candidate.id)
        {
            return Err(Rejection::TermLimited(candidate.id.clone()));
        }
        Ok(())
    }

    /// Players the current president may nominate
    pub fn eligible_chancellors(&self) -> Vec<PlayerId> {
        (0..self.players.len())
            .filter(|&seat| self.check_chancellor_eligibility(seat).is_ok())
            .map(|seat| self.players[seat].id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_nomination_enters_vote() {
        let mut game = game(6);
        let nomination = game.nominate_chancellor("p0", "p2").unwrap();

        assert_eq!(nomination.chancellor_id, "p2");
        assert_eq!(game.phase, GamePhase::Vote);
        assert_eq!(game.chancellor_index, Some(2));
        assert!(matches!(
            game.history.last().map(|h| &h.event),
            Some(HistoryEvent::Nomination { .. })
        ));
    }

    #[test]
    fn test_only_president_nominates() {
        let mut game = game(6);
        assert_eq!(
            game.nominate_chancellor("p1", "p2"),
            Err(Rejection::NotYourTurn)
        );
        assert_eq!(game.phase, GamePhase::Nominate);
    }

    #[test]
    fn test_cannot_nominate_self_dead_or_unknown() {
        let mut game = game(6);
        game.players[3].alive = false;

        assert_eq!(
            game.nominate_chancellor("p0", "p0"),
            Err(Rejection::InvalidTarget("p0".to_string()))
        );
        assert_eq!(
            game.nominate_chancellor("p0", "p3"),
            Err(Rejection::PlayerDead("p3".to_string()))
        );
        assert_eq!(
            game.nominate_chancellor("p0", "nobody"),
            Err(Rejection::UnknownPlayer("nobody".to_string()))
        );
        assert!(game.chancellor_index.is_none());
    }

    #[test]
    fn test_prevents_nominating_last_president() {
        let mut game = game(6);
        game.last_president_id = Some(id(&game, 0));
        game.president_index = 1;

        assert_eq!(
            game.nominate_chancellor("p1", "p0"),
            Err(Rejection::TermLimited("p0".to_string()))
        );
    }

    #[test]
    fn test_allows_last_president_when_five_alive() {
        let mut game = game(5);
        game.last_president_id = Some(id(&game, 0));
        game.president_index = 1;

        assert!(game.nominate_chancellor("p1", "p0").is_ok());
    }

    #[test]
    fn test_five_alive_after_deaths_relaxes_president_limit() {
        let mut game = game(6);
        game.players[5].alive = false;
        game.last_president_id = Some(id(&game, 0));
        game.president_index = 1;

        assert!(game.nominate_chancellor("p1", "p0").is_ok());
    }

    #[test]
    fn test_last_chancellor_always_term_limited() {
        for count in [5, 7, 10] {
            let mut game = game(count);
            game.last_chancellor_id = Some(id(&game, 2));
            assert_eq!(
                game.nominate_chancellor("p0", "p2"),
                Err(Rejection::TermLimited("p2".to_string()))
            );
            assert!(!game.eligible_chancellors().contains(&"p2".to_string()));
        }
    }

    #[test]
    fn test_eligible_chancellors_list() {
        let mut game = game(7);
        game.last_president_id = Some(id(&game, 1));
        game.last_chancellor_id = Some(id(&game, 2));
        game.players[3].alive = false;

        assert_eq!(game.eligible_chancellors(), vec!["p4", "p5", "p6"]);
    }

    #[test]
    fn test_nominate_rejected_outside_phase() {
        let mut game = game(5);
        game.nominate_chancellor("p0", "p1").unwrap();
        assert_eq!(
            game.nominate_chancellor("p0", "p2"),
            Err(Rejection::WrongPhase {
                expected: GamePhase::Nominate,
                actual: GamePhase::Vote
            })
        );
    }
}
