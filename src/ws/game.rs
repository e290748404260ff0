//! In-game action handlers
//!
//! Each handler runs one state machine call through [`AppState::play`] and
//! names the events that action publishes. Board updates and prompts are
//! sent by `play` itself.

use crate::game::{PolicyChoice, PolicyOutcome, VetoOutcome, VoteOutcome};
use crate::protocol::ServerMessage;
use crate::state::{ActionError, AppState, ClientHandle};
use crate::types::Policy;
use std::sync::Arc;

/// Rule violations are dropped silently; registry failures go back to the
/// sender.
fn settle<T>(client: &ClientHandle, result: Result<T, ActionError>) -> Option<ServerMessage> {
    match result {
        Ok(_) => None,
        Err(ActionError::Rejected(rejection)) => {
            tracing::debug!("Action from {} rejected: {}", client.id, rejection);
            None
        }
        Err(ActionError::Registry(e)) => {
            tracing::info!("Action from {} refused: {}", client.id, e);
            Some(e.into())
        }
    }
}

pub async fn handle_nominate(
    state: &Arc<AppState>,
    client: &ClientHandle,
    chancellor_id: String,
) -> Option<ServerMessage> {
    let result = state
        .play(
            &client.id,
            |game, actor| game.nominate_chancellor(actor, &chancellor_id),
            |room, nomination| {
                room.broadcast(&ServerMessage::Nomination {
                    president_id: nomination.president_id.clone(),
                    chancellor_id: nomination.chancellor_id.clone(),
                })
            },
        )
        .await;
    settle(client, result)
}

pub async fn handle_cast_vote(
    state: &Arc<AppState>,
    client: &ClientHandle,
    ja: bool,
) -> Option<ServerMessage> {
    let result = state
        .play(
            &client.id,
            |game, actor| game.handle_vote(actor, ja),
            |room, outcome| match outcome {
                VoteOutcome::Recorded {
                    voter_id,
                    waiting_on,
                } => room.broadcast(&ServerMessage::VoteCast {
                    player_id: voter_id.clone(),
                    waiting_on: *waiting_on,
                }),
                VoteOutcome::Resolved(resolution) => room.announce_vote(resolution),
            },
        )
        .await;
    settle(client, result)
}

async fn choose_policy(
    state: &Arc<AppState>,
    client: &ClientHandle,
    choice: PolicyChoice,
) -> Option<ServerMessage> {
    let result = state
        .play(
            &client.id,
            |game, actor| game.handle_policy_choice(actor, choice),
            |room, outcome| match outcome {
                // The chancellor's new hand arrives as their prompt
                PolicyOutcome::PassedToChancellor(_) => {}
                PolicyOutcome::Enacted(enactment) => room.announce_enactment(enactment),
                PolicyOutcome::VetoRequested {
                    president_id,
                    chancellor_id,
                } => room.broadcast(&ServerMessage::VetoRequested {
                    president_id: president_id.clone(),
                    chancellor_id: chancellor_id.clone(),
                }),
            },
        )
        .await;
    settle(client, result)
}

pub async fn handle_discard_policy(
    state: &Arc<AppState>,
    client: &ClientHandle,
    policy: Policy,
) -> Option<ServerMessage> {
    choose_policy(state, client, PolicyChoice::Discard(policy)).await
}

pub async fn handle_request_veto(
    state: &Arc<AppState>,
    client: &ClientHandle,
) -> Option<ServerMessage> {
    choose_policy(state, client, PolicyChoice::Veto).await
}

pub async fn handle_veto_decision(
    state: &Arc<AppState>,
    client: &ClientHandle,
    accept: bool,
) -> Option<ServerMessage> {
    let result = state
        .play(
            &client.id,
            |game, actor| game.handle_veto_decision(actor, accept),
            |room, outcome| {
                room.broadcast(&ServerMessage::VetoResult { accepted: accept });
                if let VetoOutcome::Accepted(tracker) = outcome {
                    room.announce_tracker(tracker);
                }
            },
        )
        .await;
    settle(client, result)
}

pub async fn handle_use_power(
    state: &Arc<AppState>,
    client: &ClientHandle,
    target_id: Option<String>,
) -> Option<ServerMessage> {
    let result = state
        .play(
            &client.id,
            |game, actor| game.handle_power(actor, target_id.as_deref()),
            |room, power| room.announce_power(power),
        )
        .await;
    settle(client, result)
}
