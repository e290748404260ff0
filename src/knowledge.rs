//! Per-player projections of the authoritative game
//!
//! Nothing here mutates a [`Game`]. The router calls these to decide what a
//! player is allowed to see: their role knowledge, the action they currently
//! owe, and the public board.

use crate::game::{Game, ELECTION_TRACKER_LIMIT, HITLER_ELECTION_THRESHOLD, SMALL_TABLE_ALIVE};
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Largest table at which Hitler learns who the fascists are
pub const HITLER_KNOWS_TEAM_MAX_PLAYERS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownPlayer {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
}

/// What a player knows about the table at game start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleKnowledge {
    pub player_id: PlayerId,
    pub role: Role,
    /// Other players whose roles this player knows
    pub known: Vec<KnownPlayer>,
}

/// Compute role knowledge for one seat. Fascists see the whole fascist team
/// including Hitler; Hitler sees the fascists only at small tables.
pub fn role_knowledge(game: &Game, player_id: &str) -> Option<RoleKnowledge> {
    let me = game.player(player_id)?;

    let sees_team = match me.role {
        Role::Liberal => false,
        Role::Fascist => true,
        Role::Hitler => game.players.len() <= HITLER_KNOWS_TEAM_MAX_PLAYERS,
    };

    let known = if sees_team {
        game.players
            .iter()
            .filter(|p| p.id != me.id && p.role != Role::Liberal)
            .map(|p| KnownPlayer {
                id: p.id.clone(),
                name: p.name.clone(),
                role: p.role,
            })
            .collect()
    } else {
        Vec::new()
    };

    Some(RoleKnowledge {
        player_id: me.id.clone(),
        role: me.role,
        known,
    })
}

/// An action the server is waiting on from a specific player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Prompt {
    Nominate {
        eligible: Vec<PlayerId>,
    },
    Vote {
        president_id: PlayerId,
        chancellor_id: PlayerId,
    },
    PresidentDiscard {
        policies: Vec<Policy>,
    },
    ChancellorDiscard {
        policies: Vec<Policy>,
        veto_allowed: bool,
    },
    VetoDecision {
        chancellor_id: PlayerId,
    },
    UsePower {
        power: Power,
        /// Empty for powers that take no target
        eligible: Vec<PlayerId>,
    },
}

/// The action `player_id` owes right now, if any.
///
/// Derived purely from game state, so the same answer serves live play and
/// a reconnecting client.
pub fn pending_prompt(game: &Game, player_id: &str) -> Option<Prompt> {
    let me = game.player(player_id)?;
    if !me.alive {
        return None;
    }
    let is_president = game.president_id() == player_id;
    let is_chancellor = game.chancellor().is_some_and(|c| c.id == player_id);

    match game.phase {
        GamePhase::Nominate if is_president => Some(Prompt::Nominate {
            eligible: game.eligible_chancellors(),
        }),
        GamePhase::Vote if !me.has_voted => Some(Prompt::Vote {
            president_id: game.president_id().clone(),
            chancellor_id: game.chancellor()?.id.clone(),
        }),
        GamePhase::Policy => {
            let session = game.legislative.as_ref()?;
            match session.step {
                PolicyStep::President if is_president => Some(Prompt::PresidentDiscard {
                    policies: session.hand.clone(),
                }),
                PolicyStep::Chancellor if is_chancellor => Some(Prompt::ChancellorDiscard {
                    policies: session.hand.clone(),
                    veto_allowed: game.veto_unlocked(),
                }),
                PolicyStep::Veto if is_president => Some(Prompt::VetoDecision {
                    chancellor_id: game.chancellor()?.id.clone(),
                }),
                _ => None,
            }
        }
        GamePhase::Power => {
            let pending = game.pending_power.as_ref()?;
            (pending.president_id == player_id).then(|| Prompt::UsePower {
                power: pending.power,
                eligible: game.eligible_power_targets(),
            })
        }
        _ => None,
    }
}

/// Short hints for what `player_id` should be doing in the current phase.
/// Empty for players who are not seated in the game.
pub fn tips_for(game: &Game, player_id: &str) -> Vec<String> {
    if game.player(player_id).is_none() {
        return Vec::new();
    }
    let is_president = game.president_id() == player_id;
    let is_chancellor = game.chancellor().is_some_and(|c| c.id == player_id);
    let mut tips: Vec<String> = Vec::new();

    match game.phase {
        GamePhase::Nominate if is_president => {
            tips.push("Choose an eligible player to nominate as Chancellor.".into());
        }
        GamePhase::Nominate => {
            tips.push("Waiting for the President to nominate a Chancellor.".into());
        }
        GamePhase::Vote => {
            tips.push(format!(
                "Voting Ja will elect the proposed government. A Nein vote advances the election tracker ({}/{}).",
                game.failed_elections, ELECTION_TRACKER_LIMIT
            ));
            if game.enacted.fascist >= HITLER_ELECTION_THRESHOLD {
                tips.push("If Hitler is elected Chancellor, the Fascists instantly win.".into());
            }
        }
        GamePhase::Policy => match game.policy_step() {
            Some(PolicyStep::President) if is_president => {
                tips.push("Discard one policy to pass the other two to the Chancellor.".into());
            }
            Some(PolicyStep::Chancellor) if is_chancellor => {
                tips.push("Discard one policy to enact the remaining tile.".into());
                if game.veto_unlocked() {
                    tips.push("You may request a veto instead.".into());
                }
            }
            Some(PolicyStep::Veto) if is_president => {
                tips.push("Accepting the veto discards both policies and advances the tracker.".into());
            }
            _ => tips.push("Waiting for the government to resolve the policy.".into()),
        },
        GamePhase::Power => {
            let tip = match &game.pending_power {
                Some(pending) if pending.president_id == player_id => match pending.power {
                    Power::Investigate => "Select a player to investigate their Party Membership.",
                    Power::SpecialElection => "Choose a player to be the next Presidential Candidate.",
                    Power::PolicyPeek => "View the top three policy tiles.",
                    Power::Execution => "Select a player to execute. If Hitler dies, Liberals win.",
                },
                _ => "Waiting for the President to use their power.",
            };
            tips.push(tip.into());
        }
        GamePhase::GameOver => tips.push("Game over.".into()),
    }

    if !game.is_over() && game.failed_elections + 1 == ELECTION_TRACKER_LIMIT {
        tips.push("One more failed election will enact the top policy automatically.".into());
    }
    tips
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicPlayer {
    pub id: PlayerId,
    pub name: String,
    pub alive: bool,
    pub has_voted: bool,
    /// Revealed only once the game is over
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Board state safe to broadcast to the whole room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicGameView {
    pub phase: GamePhase,
    pub players: Vec<PublicPlayer>,
    pub president_id: PlayerId,
    pub chancellor_id: Option<PlayerId>,
    pub policy_step: Option<PolicyStep>,
    pub failed_elections: u8,
    pub enacted: EnactedPolicies,
    pub deck_size: usize,
    pub discard_size: usize,
    pub term_limited: Vec<PlayerId>,
    pub investigated_ids: Vec<PlayerId>,
    pub pending_power: Option<Power>,
    pub game_over: Option<GameOver>,
}

pub fn public_view(game: &Game) -> PublicGameView {
    let reveal = game.is_over();
    let players = game
        .players
        .iter()
        .map(|p| PublicPlayer {
            id: p.id.clone(),
            name: p.name.clone(),
            alive: p.alive,
            has_voted: p.has_voted,
            role: reveal.then_some(p.role),
        })
        .collect();

    let mut term_limited: Vec<PlayerId> = game.last_chancellor_id.iter().cloned().collect();
    if game.alive_count() > SMALL_TABLE_ALIVE {
        term_limited.extend(game.last_president_id.iter().cloned());
    }

    PublicGameView {
        phase: game.phase,
        players,
        president_id: game.president_id().clone(),
        chancellor_id: game.chancellor().map(|c| c.id.clone()),
        policy_step: game.policy_step(),
        failed_elections: game.failed_elections,
        enacted: game.enacted,
        deck_size: game.deck.draw_len(),
        discard_size: game.deck.discard_len(),
        term_limited,
        investigated_ids: game.investigated_ids.clone(),
        pending_power: game.pending_power.as_ref().map(|p| p.power),
        game_over: game.game_over,
    }
}
