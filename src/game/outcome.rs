//! Typed results of accepted state machine actions
//!
//! Every outcome says what changed so the router can decide who hears about it.

use super::ELECTION_TRACKER_LIMIT;
use crate::types::{Ballot, GameOver, Party, PlayerId, Policy, Power};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nomination {
    pub president_id: PlayerId,
    pub chancellor_id: PlayerId,
}

/// Cards handed to a legislator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyHand {
    pub player_id: PlayerId,
    pub policies: Vec<Policy>,
    pub veto_allowed: bool,
}

/// Result of a policy going through `process_policy`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enactment {
    pub policy: Policy,
    /// Enacted by the election tracker rather than a government
    pub forced: bool,
    pub game_over: Option<GameOver>,
    pub granted_power: Option<GrantedPower>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantedPower {
    pub power: Power,
    pub president_id: PlayerId,
}

/// Result of a government failing (vote down, veto, or collapse)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerAdvance {
    /// Tracker value after this failure; 0 when it triggered an auto-enactment
    pub failed_elections: u8,
    pub auto_enacted: Option<Enactment>,
}

impl TrackerAdvance {
    /// Count this failure pushed the tracker to, before a full tracker resets
    pub fn reached(&self) -> u8 {
        if self.failed_elections == 0 {
            ELECTION_TRACKER_LIMIT
        } else {
            self.failed_elections
        }
    }

    pub fn game_over(&self) -> Option<GameOver> {
        self.auto_enacted.as_ref().and_then(|e| e.game_over)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Ballot recorded; the round waits on `waiting_on` more alive players
    Recorded {
        voter_id: PlayerId,
        waiting_on: usize,
    },
    Resolved(VoteResolution),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteResolution {
    pub president_id: PlayerId,
    pub chancellor_id: PlayerId,
    pub passed: bool,
    pub ballots: Vec<Ballot>,
    pub game_over: Option<GameOver>,
    /// President's hand when the government passed and the session began
    pub legislative: Option<PolicyHand>,
    /// Tracker consequences when the government failed
    pub tracker: Option<TrackerAdvance>,
}

/// A legislator's choice of card to get rid of, or a veto request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyChoice {
    Discard(Policy),
    Veto,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyOutcome {
    PassedToChancellor(PolicyHand),
    Enacted(Enactment),
    VetoRequested {
        president_id: PlayerId,
        chancellor_id: PlayerId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VetoOutcome {
    Accepted(TrackerAdvance),
    /// Chancellor must choose again from the same two cards
    Rejected(PolicyHand),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PowerOutcome {
    Investigated {
        target_id: PlayerId,
        party: Party,
    },
    SpecialElection {
        target_id: PlayerId,
    },
    PolicyPeek {
        policies: Vec<Policy>,
    },
    Executed {
        target_id: PlayerId,
        game_over: Option<GameOver>,
    },
}

impl PowerOutcome {
    pub fn power(&self) -> Power {
        match self {
            PowerOutcome::Investigated { .. } => Power::Investigate,
            PowerOutcome::SpecialElection { .. } => Power::SpecialElection,
            PowerOutcome::PolicyPeek { .. } => Power::PolicyPeek,
            PowerOutcome::Executed { .. } => Power::Execution,
        }
    }

    pub fn target_id(&self) -> Option<&PlayerId> {
        match self {
            PowerOutcome::Investigated { target_id, .. }
            | PowerOutcome::SpecialElection { target_id }
            | PowerOutcome::Executed { target_id, .. } => Some(target_id),
            PowerOutcome::PolicyPeek { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerResult {
    pub president_id: PlayerId,
    pub outcome: PowerOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// Marked dead; no turn-order consequences
    Uninvolved,
    /// Their departure completed a pending vote round
    VoteResolved(VoteResolution),
    /// They held office or a pending power; the government failed
    GovernmentCollapsed(TrackerAdvance),
    GameOver(GameOver),
}
