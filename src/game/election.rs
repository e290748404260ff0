use super::{Game, GameResult, Rejection, VoteOutcome, VoteResolution, HITLER_ELECTION_THRESHOLD};
use crate::types::{Ballot, GameOver, GamePhase, HistoryEvent, Role, WinReason, Winner};

impl Game {
    /// Record one alive player's ballot; resolves once every alive player voted
    pub fn handle_vote(&mut self, voter_id: &str, ja: bool) -> GameResult<VoteOutcome> {
        self.require_phase(GamePhase::Vote)?;
        let seat = self
            .index_of(voter_id)
            .ok_or_else(|| Rejection::UnknownPlayer(voter_id.to_string()))?;
        let voter = &mut self.players[seat];
        if !voter.alive {
            return Err(Rejection::PlayerDead(voter.id.clone()));
        }
        if voter.has_voted {
            return Err(Rejection::AlreadyVoted);
        }
        voter.has_voted = true;
        voter.current_vote = Some(ja);

        let waiting_on = self.votes_outstanding();
        if waiting_on > 0 {
            return Ok(VoteOutcome::Recorded {
                voter_id: voter_id.to_string(),
                waiting_on,
            });
        }

        Ok(VoteOutcome::Resolved(self.resolve_vote()))
    }

    pub fn votes_outstanding(&self) -> usize {
        self.players
            .iter()
            .filter(|p| p.alive && !p.has_voted)
            .count()
    }

    /// Tally alive ballots. Strict majority of alive players elects the
    /// government. Ballots are cleared whatever the result.
    pub(crate) fn resolve_vote(&mut self) -> VoteResolution {
        let ballots: Vec<Ballot> = self
            .players
            .iter()
            .filter(|p| p.alive)
            .filter_map(|p| {
                p.current_vote.map(|ja| Ballot {
                    player_id: p.id.clone(),
                    ja,
                })
            })
            .collect();
        let yes = ballots.iter().filter(|b| b.ja).count();
        let passed = yes > self.alive_count() / 2;

        self.record(HistoryEvent::Vote {
            passed,
            ballots: ballots.clone(),
        });
        self.clear_votes();

        let president_id = self.president_id().clone();
        let chancellor = self.chancellor().map(|c| (c.id.clone(), c.role));
        let chancellor_id = chancellor
            .as_ref()
            .map(|(id, _)| id.clone())
            .unwrap_or_default();

        let mut resolution = VoteResolution {
            president_id: president_id.clone(),
            chancellor_id: chancellor_id.clone(),
            passed,
            ballots,
            game_over: None,
            legislative: None,
            tracker: None,
        };

        let Some((_, chancellor_role)) = chancellor.filter(|_| passed) else {
            tracing::debug!("Government {} / {} rejected", president_id, chancellor_id);
            let tracker = self.fail_government();
            resolution.game_over = tracker.game_over();
            resolution.tracker = Some(tracker);
            return resolution;
        };

        tracing::debug!("Government {} / {} elected", president_id, chancellor_id);
        self.last_president_id = Some(president_id);
        self.last_chancellor_id = Some(chancellor_id);

        if chancellor_role == Role::Hitler && self.enacted.fascist >= HITLER_ELECTION_THRESHOLD {
            let over = GameOver::new(Winner::Fascists, WinReason::HitlerElected);
            self.finish(over);
            resolution.game_over = Some(over);
            return resolution;
        }

        self.failed_elections = 0;
        resolution.legislative = Some(self.begin_policy_phase());
        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::TOTAL_POLICY_COUNT;
    use super::*;
    use crate::types::{Policy, PolicyStep};

    fn vote_all(game: &mut Game, ja: bool) -> Option<VoteResolution> {
        let voters: Vec<_> = game
            .players
            .iter()
            .filter(|p| p.alive)
            .map(|p| p.id.clone())
            .collect();
        let mut last = None;
        for voter in voters {
            if let VoteOutcome::Resolved(r) = game.handle_vote(&voter, ja).unwrap() {
                last = Some(r);
            }
        }
        last
    }

    #[test]
    fn test_vote_waits_for_every_alive_player() {
        let mut game = game(5);
        game.nominate_chancellor("p0", "p1").unwrap();

        let outcome = game.handle_vote("p0", true).unwrap();
        assert_eq!(
            outcome,
            VoteOutcome::Recorded {
                voter_id: "p0".to_string(),
                waiting_on: 4
            }
        );
        assert!(game.players[0].has_voted);
        assert_eq!(game.phase, GamePhase::Vote);
    }

    #[test]
    fn test_double_vote_rejected() {
        let mut game = game(5);
        game.nominate_chancellor("p0", "p1").unwrap();
        game.handle_vote("p2", false).unwrap();

        assert_eq!(game.handle_vote("p2", true), Err(Rejection::AlreadyVoted));
        assert_eq!(game.players[2].current_vote, Some(false));
    }

    #[test]
    fn test_dead_and_unknown_voters_rejected() {
        let mut game = game(6);
        game.players[5].alive = false;
        game.nominate_chancellor("p0", "p1").unwrap();

        assert_eq!(
            game.handle_vote("p5", true),
            Err(Rejection::PlayerDead("p5".to_string()))
        );
        assert_eq!(
            game.handle_vote("ghost", true),
            Err(Rejection::UnknownPlayer("ghost".to_string()))
        );
    }

    #[test]
    fn test_majority_counts_only_alive_players() {
        let mut game = game(5);
        game.nominate_chancellor("p0", "p1").unwrap();
        game.players[4].alive = false;

        game.handle_vote("p0", true).unwrap();
        game.handle_vote("p1", true).unwrap();
        game.handle_vote("p2", true).unwrap();
        let outcome = game.handle_vote("p3", false).unwrap();

        let VoteOutcome::Resolved(resolution) = outcome else {
            panic!("expected resolution");
        };
        assert!(resolution.passed);
        assert_eq!(resolution.ballots.len(), 4);
        assert_eq!(game.phase, GamePhase::Policy);
    }

    #[test]
    fn test_tie_fails() {
        let mut game = game(6);
        game.nominate_chancellor("p0", "p1").unwrap();
        for (seat, ja) in [true, true, true, false, false, false].into_iter().enumerate() {
            game.handle_vote(&format!("p{seat}"), ja).unwrap();
        }
        assert_eq!(game.failed_elections, 1);
        assert_eq!(game.phase, GamePhase::Nominate);
    }

    #[test]
    fn test_passed_vote_opens_legislative_session() {
        let mut game = game(5);
        stack(&mut game, &[Policy::Liberal, Policy::Fascist, Policy::Fascist]);
        game.failed_elections = 2;
        game.nominate_chancellor("p0", "p1").unwrap();

        let resolution = vote_all(&mut game, true).unwrap();
        assert!(resolution.passed);
        assert_eq!(game.failed_elections, 0);
        assert_eq!(game.last_president_id.as_deref(), Some("p0"));
        assert_eq!(game.last_chancellor_id.as_deref(), Some("p1"));
        assert_eq!(game.policy_step(), Some(PolicyStep::President));

        let hand = resolution.legislative.unwrap();
        assert_eq!(hand.player_id, "p0");
        assert_eq!(
            hand.policies,
            vec![Policy::Liberal, Policy::Fascist, Policy::Fascist]
        );
        assert_eq!(game.policy_hand().map(|h| h.len()), Some(3));
        assert_eq!(game.chancellor_index, Some(1));
    }

    #[test]
    fn test_votes_cleared_after_every_resolution() {
        let mut game = game(5);
        game.nominate_chancellor("p0", "p1").unwrap();
        vote_all(&mut game, false).unwrap();
        assert!(game
            .players
            .iter()
            .all(|p| !p.has_voted && p.current_vote.is_none()));

        game.nominate_chancellor("p1", "p2").unwrap();
        vote_all(&mut game, true).unwrap();
        assert!(game
            .players
            .iter()
            .all(|p| !p.has_voted && p.current_vote.is_none()));
    }

    #[test]
    fn test_failed_vote_advances_presidency() {
        let mut game = game(5);
        game.nominate_chancellor("p0", "p1").unwrap();
        let resolution = vote_all(&mut game, false).unwrap();

        assert!(!resolution.passed);
        assert_eq!(
            resolution.tracker.as_ref().map(|t| t.failed_elections),
            Some(1)
        );
        assert_eq!(game.president_index, 1);
        assert!(game.chancellor_index.is_none());
        assert!(game.last_chancellor_id.is_none());
    }

    #[test]
    fn test_auto_policy_after_three_failed_elections() {
        let mut game = game(5);
        stack(&mut game, &[Policy::Fascist]);
        game.last_president_id = Some("p4".to_string());
        game.last_chancellor_id = Some("p0".to_string());

        for round in 0..3 {
            let president = game.president_index;
            let nominee = game.players[(president + 1) % 5].id.clone();
            let president_id = game.president_id().clone();
            game.nominate_chancellor(&president_id, &nominee).unwrap();
            let resolution = vote_all(&mut game, false).unwrap();

            if round < 2 {
                assert_eq!(game.failed_elections, round + 1);
                assert_eq!(game.phase, GamePhase::Nominate);
                assert!(resolution.tracker.unwrap().auto_enacted.is_none());
            } else {
                let tracker = resolution.tracker.unwrap();
                let enactment = tracker.auto_enacted.unwrap();
                assert_eq!(enactment.policy, Policy::Fascist);
                assert!(enactment.forced);
            }
        }

        assert_eq!(game.failed_elections, 0);
        assert_eq!(game.enacted.total(), 1);
        assert!(game.last_president_id.is_none());
        assert!(game.last_chancellor_id.is_none());
        assert_eq!(game.cards_in_play() + game.enacted.total(), TOTAL_POLICY_COUNT);
    }

    #[test]
    fn test_auto_policy_from_tracker_grants_no_power() {
        let mut game = game(7);
        game.enacted.fascist = 1;
        stack(&mut game, &[Policy::Fascist]);
        game.failed_elections = 2;
        game.nominate_chancellor("p0", "p1").unwrap();
        vote_all(&mut game, false).unwrap();

        assert_eq!(game.enacted.fascist, 2);
        assert!(game.pending_power.is_none());
        assert_eq!(game.phase, GamePhase::Nominate);
    }

    #[test]
    fn test_electing_hitler_after_three_fascist_policies() {
        let mut game = game(5);
        game.enacted.fascist = 3;
        game.players[2].role = Role::Hitler;
        game.players[3].role = Role::Liberal;
        game.nominate_chancellor("p0", "p2").unwrap();

        let resolution = vote_all(&mut game, true).unwrap();
        assert_eq!(
            resolution.game_over,
            Some(GameOver::new(Winner::Fascists, WinReason::HitlerElected))
        );
        assert!(resolution.legislative.is_none());
        assert_eq!(game.phase, GamePhase::GameOver);
        assert!(game.legislative.is_none());
        assert!(game.chancellor_index.is_none());
    }

    #[test]
    fn test_electing_hitler_early_is_safe() {
        let mut game = game(5);
        game.enacted.fascist = 2;
        game.nominate_chancellor("p0", "p3").unwrap();

        let resolution = vote_all(&mut game, true).unwrap();
        assert!(resolution.game_over.is_none());
        assert_eq!(game.phase, GamePhase::Policy);
    }
}
