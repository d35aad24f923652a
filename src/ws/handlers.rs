//! WebSocket message dispatch
//!
//! Routes a decoded envelope to the moderator or player handler after
//! checking the sender's role. Role violations are logged and dropped.

use crate::error::GameError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::{AppState, GameState};
use crate::types::{Identity, Role};
use std::sync::Arc;

use super::{moderator, player};

/// Macro to check the sender's role and return early on mismatch
macro_rules! require_role {
    ($identity:expr, $role:expr, $action:expr) => {
        if $identity.role != $role {
            tracing::warn!(
                "{} ({:?}) is not allowed to {}",
                $identity.name,
                $identity.role,
                $action
            );
            return None;
        }
    };
}

/// Handle client messages and return optional response
pub async fn handle_message(
    msg: ClientMessage,
    identity: &Identity,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match msg {
        // Liveness probes never touch the state lock
        ClientMessage::Ping => Some(ServerMessage::Pong),

        ClientMessage::Register(registration) => {
            tracing::warn!(
                "{} sent a second registration (as {}), ignoring",
                identity.name,
                registration.name
            );
            None
        }

        // Moderator-only commands
        ClientMessage::AskQuestion(payload) => {
            require_role!(identity, Role::Moderator, "ask questions");
            moderator::handle_ask_question(state, identity, payload).await
        }

        ClientMessage::EndRound => {
            require_role!(identity, Role::Moderator, "end rounds");
            moderator::handle_end_round(state, identity).await
        }

        ClientMessage::JudgeAnswer(payload) => {
            require_role!(identity, Role::Moderator, "judge answers");
            moderator::handle_judge_answer(state, identity, payload).await
        }

        ClientMessage::StartCountdown(payload) => {
            require_role!(identity, Role::Moderator, "start countdowns");
            moderator::handle_start_countdown(state, identity, payload).await
        }

        ClientMessage::ResetGame => {
            require_role!(identity, Role::Moderator, "reset the game");
            moderator::handle_reset_game(state, identity).await
        }

        ClientMessage::UpdateScore(payload) => {
            require_role!(identity, Role::Moderator, "update scores");
            moderator::handle_update_score(state, identity, payload).await
        }

        // Player-only commands
        ClientMessage::SubmitAnswer(payload) => {
            require_role!(identity, Role::Player, "submit answers");
            player::handle_submit_answer(state, identity, payload).await
        }

        ClientMessage::VoteAnswer(payload) => {
            require_role!(identity, Role::Player, "vote");
            player::handle_vote_answer(state, identity, payload).await
        }
    }
}

/// Run a mutation, logging it either way. Mutations never produce a direct reply.
pub(super) async fn apply<F>(state: &AppState, action: &str, op: F) -> Option<ServerMessage>
where
    F: FnOnce(&mut GameState) -> Result<(), GameError>,
{
    match state.mutate(op).await {
        Ok(()) => tracing::info!("Applied {}", action),
        Err(e) => tracing::warn!("Rejected {}: {}", action, e),
    }
    None
}

/// Like `apply`, but only for the session currently holding the moderator seat
pub(super) async fn apply_as_moderator<F>(
    state: &AppState,
    identity: &Identity,
    action: &str,
    op: F,
) -> Option<ServerMessage>
where
    F: FnOnce(&mut GameState) -> Result<(), GameError>,
{
    apply(state, action, |game| {
        game.ensure_moderator(identity)?;
        op(game)
    })
    .await
}
