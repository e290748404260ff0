//! Authoritative per-room game state machine
//!
//! Handlers are split by phase (nomination, election, legislative, executive,
//! disconnect). Every handler validates before it mutates, so a returned
//! [`Rejection`] always leaves the game untouched.

mod deck;
mod disconnect;
mod election;
mod error;
mod executive;
mod legislative;
mod nomination;
mod outcome;
mod powers;
mod roles;

pub use deck::{PolicyDeck, FASCIST_POLICY_COUNT, LIBERAL_POLICY_COUNT, TOTAL_POLICY_COUNT};
pub use error::{GameResult, Rejection};
pub use outcome::*;
pub use powers::power_for;
pub use roles::{assign_roles, role_distribution, RoleDistribution};

use crate::types::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

/// Liberal policies needed for a liberal win
pub const LIBERAL_POLICIES_TO_WIN: u8 = 5;
/// Fascist policies needed for a fascist win
pub const FASCIST_POLICIES_TO_WIN: u8 = 6;
/// Fascist policies after which electing Hitler wins the game
pub const HITLER_ELECTION_THRESHOLD: u8 = 3;
/// Fascist policies after which the chancellor may request a veto
pub const VETO_THRESHOLD: u8 = 5;
/// Consecutive failed governments that force an auto-enactment
pub const ELECTION_TRACKER_LIMIT: u8 = 3;
/// Seats alive at which the last president becomes eligible as chancellor again
pub const SMALL_TABLE_ALIVE: usize = 5;

/// In-flight legislative session. Exists exactly while the phase is `Policy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegislativeSession {
    pub hand: Vec<Policy>,
    pub step: PolicyStep,
}

/// A granted power awaiting use. Exists exactly while the phase is `Power`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPower {
    pub power: Power,
    pub president_id: PlayerId,
}

#[derive(Debug, Clone)]
pub struct Game {
    pub players: Vec<GamePlayer>,
    pub phase: GamePhase,
    pub president_index: usize,
    pub chancellor_index: Option<usize>,
    pub failed_elections: u8,
    pub deck: PolicyDeck,
    pub enacted: EnactedPolicies,
    pub last_president_id: Option<PlayerId>,
    pub last_chancellor_id: Option<PlayerId>,
    pub legislative: Option<LegislativeSession>,
    pub pending_power: Option<PendingPower>,
    pub special_election_return_index: Option<usize>,
    pub investigated_ids: Vec<PlayerId>,
    pub history: Vec<HistoryEntry>,
    pub game_over: Option<GameOver>,
}

impl Game {
    /// Start a game for the given `(id, name)` seats with OS randomness
    pub fn new(seats: Vec<(PlayerId, String)>) -> GameResult<Self> {
        Self::with_rng(seats, StdRng::from_rng(&mut rand::rng()))
    }

    /// Start a reproducible game; roles, first president and deck order all
    /// derive from `seed`.
    pub fn with_seed(seats: Vec<(PlayerId, String)>, seed: u64) -> GameResult<Self> {
        Self::with_rng(seats, StdRng::seed_from_u64(seed))
    }

    fn with_rng(seats: Vec<(PlayerId, String)>, mut rng: StdRng) -> GameResult<Self> {
        let roles = assign_roles(seats.len(), &mut rng)
            .ok_or(Rejection::UnsupportedPlayerCount(seats.len()))?;

        let mut seen = HashSet::new();
        if let Some((dup, _)) = seats.iter().find(|(id, _)| !seen.insert(id.as_str())) {
            return Err(Rejection::DuplicatePlayer(dup.clone()));
        }

        let president_index = rng.random_range(0..seats.len());
        let deck = PolicyDeck::new(StdRng::from_rng(&mut rng));

        let players = seats
            .into_iter()
            .zip(roles)
            .map(|((id, name), role)| GamePlayer {
                id,
                name,
                role,
                alive: true,
                has_voted: false,
                current_vote: None,
            })
            .collect();

        Ok(Self {
            players,
            phase: GamePhase::Nominate,
            president_index,
            chancellor_index: None,
            failed_elections: 0,
            deck,
            enacted: EnactedPolicies::default(),
            last_president_id: None,
            last_chancellor_id: None,
            legislative: None,
            pending_power: None,
            special_election_return_index: None,
            investigated_ids: Vec::new(),
            history: Vec::new(),
            game_over: None,
        })
    }

    pub fn index_of(&self, player_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id == player_id)
    }

    pub fn player(&self, player_id: &str) -> Option<&GamePlayer> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn president(&self) -> &GamePlayer {
        &self.players[self.president_index]
    }

    pub fn president_id(&self) -> &PlayerId {
        &self.president().id
    }

    pub fn chancellor(&self) -> Option<&GamePlayer> {
        self.chancellor_index.map(|i| &self.players[i])
    }

    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| p.alive).count()
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn policy_hand(&self) -> Option<&[Policy]> {
        self.legislative.as_ref().map(|s| s.hand.as_slice())
    }

    pub fn policy_step(&self) -> Option<PolicyStep> {
        self.legislative.as_ref().map(|s| s.step)
    }

    pub fn veto_unlocked(&self) -> bool {
        self.enacted.fascist >= VETO_THRESHOLD
    }

    /// Cards not yet enacted: draw pile, discard pile and the hand in play
    pub fn cards_in_play(&self) -> usize {
        self.deck.draw_len() + self.deck.discard_len() + self.policy_hand().map_or(0, |h| h.len())
    }

    fn require_phase(&self, expected: GamePhase) -> GameResult<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(Rejection::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    fn record(&mut self, event: HistoryEvent) {
        self.history.push(HistoryEntry {
            ts: chrono::Utc::now().to_rfc3339(),
            event,
        });
    }

    fn clear_votes(&mut self) {
        for player in &mut self.players {
            player.has_voted = false;
            player.current_vote = None;
        }
    }

    /// First alive seat at or after `start`, wrapping around the table
    fn next_alive_seat(&self, start: usize) -> usize {
        let n = self.players.len();
        (0..n)
            .map(|offset| (start + offset) % n)
            .find(|&i| self.players[i].alive)
            .unwrap_or(start % n)
    }

    /// Move the presidency on. A pending special-election return seat takes
    /// precedence; dead seats are always skipped.
    pub(crate) fn advance_presidency(&mut self) {
        let start = self
            .special_election_return_index
            .take()
            .unwrap_or(self.president_index + 1);
        self.president_index = self.next_alive_seat(start);
    }

    fn end_term(&mut self) {
        self.advance_presidency();
        self.phase = GamePhase::Nominate;
    }

    fn finish(&mut self, over: GameOver) {
        tracing::info!("Game over: {:?} win by {:?}", over.winner, over.reason);
        if let Some(session) = self.legislative.take() {
            for card in session.hand {
                self.deck.discard(card);
            }
        }
        self.chancellor_index = None;
        self.pending_power = None;
        self.game_over = Some(over);
        self.phase = GamePhase::GameOver;
    }

    /// Draw three cards for the president and open the legislative session
    pub fn begin_policy_phase(&mut self) -> PolicyHand {
        let hand = self.deck.draw(3);
        self.legislative = Some(LegislativeSession {
            hand: hand.clone(),
            step: PolicyStep::President,
        });
        self.phase = GamePhase::Policy;

        PolicyHand {
            player_id: self.president_id().clone(),
            policies: hand,
            veto_allowed: false,
        }
    }

    /// Enact a policy: bump the track, check victory, then either grant the
    /// president a power or end the term. `grant_powers` is false only for
    /// tracker-forced enactments.
    pub fn process_policy(&mut self, policy: Policy, grant_powers: bool) -> Enactment {
        match policy {
            Policy::Liberal => self.enacted.liberal += 1,
            Policy::Fascist => self.enacted.fascist += 1,
        }
        self.record(HistoryEvent::Policy {
            policy,
            forced: !grant_powers,
        });
        self.chancellor_index = None;
        self.legislative = None;

        let game_over = if self.enacted.liberal >= LIBERAL_POLICIES_TO_WIN {
            Some(GameOver::new(Winner::Liberals, WinReason::LiberalPolicies))
        } else if self.enacted.fascist >= FASCIST_POLICIES_TO_WIN {
            Some(GameOver::new(Winner::Fascists, WinReason::FascistPolicies))
        } else {
            None
        };

        let mut enactment = Enactment {
            policy,
            forced: !grant_powers,
            game_over,
            granted_power: None,
        };

        if let Some(over) = game_over {
            self.finish(over);
            return enactment;
        }

        let power = if policy == Policy::Fascist && grant_powers {
            power_for(self.players.len(), self.enacted.fascist)
        } else {
            None
        };

        match power {
            Some(power) => {
                let president_id = self.president_id().clone();
                tracing::debug!("{:?} granted to president {}", power, president_id);
                self.pending_power = Some(PendingPower {
                    power,
                    president_id: president_id.clone(),
                });
                self.phase = GamePhase::Power;
                enactment.granted_power = Some(GrantedPower {
                    power,
                    president_id,
                });
            }
            None => self.end_term(),
        }

        enactment
    }

    /// A government failed to take office or collapsed. Advances the election
    /// tracker and force-enacts the top card when it fills up.
    pub(crate) fn fail_government(&mut self) -> TrackerAdvance {
        self.failed_elections += 1;
        self.chancellor_index = None;
        self.pending_power = None;
        if let Some(session) = self.legislative.take() {
            for card in session.hand {
                self.deck.discard(card);
            }
        }
        self.clear_votes();

        if self.failed_elections < ELECTION_TRACKER_LIMIT {
            self.end_term();
            return TrackerAdvance {
                failed_elections: self.failed_elections,
                auto_enacted: None,
            };
        }

        tracing::info!("Election tracker full, enacting top policy");
        let auto_enacted = match self.deck.draw(1).pop() {
            Some(policy) => Some(self.process_policy(policy, false)),
            None => {
                self.end_term();
                None
            }
        };
        self.failed_elections = 0;
        self.last_president_id = None;
        self.last_chancellor_id = None;

        TrackerAdvance {
            failed_elections: 0,
            auto_enacted,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_new_game_shape() {
        let game = Game::with_seed(seats(7), 1).unwrap();
        assert_eq!(game.players.len(), 7);
        assert_eq!(game.phase, GamePhase::Nominate);
        assert!(game.president_index < 7);
        assert!(game.chancellor_index.is_none());
        assert_eq!(game.cards_in_play(), TOTAL_POLICY_COUNT);
        assert_eq!(
            game.players
                .iter()
                .filter(|p| p.role == Role::Hitler)
                .count(),
            1
        );
        assert!(game.players.iter().all(|p| p.alive && !p.has_voted));
    }

    #[test]
    fn test_unsupported_player_counts() {
        assert_eq!(
            Game::with_seed(seats(4), 1).unwrap_err(),
            Rejection::UnsupportedPlayerCount(4)
        );
        assert_eq!(
            Game::with_seed(seats(11), 1).unwrap_err(),
            Rejection::UnsupportedPlayerCount(11)
        );
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut s = seats(5);
        s[3].0 = "p0".to_string();
        assert_eq!(
            Game::with_seed(s, 1).unwrap_err(),
            Rejection::DuplicatePlayer("p0".to_string())
        );
    }

    #[test]
    fn test_advance_skips_dead_seats() {
        let mut game = game(6);
        game.players[1].alive = false;
        game.players[2].alive = false;
        game.advance_presidency();
        assert_eq!(game.president_index, 3);

        game.president_index = 5;
        game.advance_presidency();
        assert_eq!(game.president_index, 0);
    }

    #[test]
    fn test_special_election_return_skips_dead_seat() {
        let mut game = game(7);
        game.president_index = 4;
        game.special_election_return_index = Some(1);
        game.players[1].alive = false;

        game.advance_presidency();
        assert_eq!(game.president_index, 2);
        assert_eq!(game.special_election_return_index, None);
    }

    #[test]
    fn test_liberal_track_victory() {
        let mut game = game(5);
        game.enacted.liberal = 4;
        let enactment = game.process_policy(Policy::Liberal, true);

        assert_eq!(
            enactment.game_over,
            Some(GameOver::new(Winner::Liberals, WinReason::LiberalPolicies))
        );
        assert_eq!(game.phase, GamePhase::GameOver);
        assert_eq!(game.game_over, enactment.game_over);
    }

    #[test]
    fn test_fascist_track_victory_grants_no_power() {
        let mut game = game(7);
        game.enacted.fascist = 5;
        let enactment = game.process_policy(Policy::Fascist, true);

        assert_eq!(
            enactment.game_over,
            Some(GameOver::new(Winner::Fascists, WinReason::FascistPolicies))
        );
        assert_eq!(enactment.granted_power, None);
        assert!(game.pending_power.is_none());
    }

    #[test]
    fn test_process_policy_without_power_advances() {
        let mut game = game(5);
        let enactment = game.process_policy(Policy::Fascist, true);

        assert_eq!(enactment.granted_power, None);
        assert_eq!(game.phase, GamePhase::Nominate);
        assert_eq!(game.president_index, 1);
        assert_eq!(game.enacted.fascist, 1);
    }

    #[test]
    fn test_third_fascist_in_seven_player_game_grants_special_election() {
        let mut game = game(7);
        game.enacted.fascist = 2;
        let enactment = game.process_policy(Policy::Fascist, true);

        assert_eq!(
            enactment.granted_power,
            Some(GrantedPower {
                power: Power::SpecialElection,
                president_id: id(&game, 0),
            })
        );
        assert_eq!(game.phase, GamePhase::Power);
        assert_eq!(
            game.pending_power.as_ref().map(|p| p.power),
            Some(Power::SpecialElection)
        );
        assert_eq!(game.president_index, 0);
    }

    #[test]
    fn test_forced_policy_grants_no_power() {
        let mut game = game(7);
        game.enacted.fascist = 2;
        let enactment = game.process_policy(Policy::Fascist, false);

        assert!(enactment.forced);
        assert_eq!(enactment.granted_power, None);
        assert_eq!(game.phase, GamePhase::Nominate);
    }

    #[test]
    fn test_history_records_policy() {
        let mut game = game(5);
        game.process_policy(Policy::Liberal, true);
        assert_eq!(
            game.history.last().map(|h| &h.event),
            Some(&HistoryEvent::Policy {
                policy: Policy::Liberal,
                forced: false
            })
        );
    }
}
