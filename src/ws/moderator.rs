//! Moderator-only command handlers
//!
//! The dispatch layer checks the role. These additionally require the
//! sender to still hold the moderator seat when the mutation runs.

use chrono::Utc;
use std::sync::Arc;

use super::handlers::apply_as_moderator;
use crate::protocol::{
    AskQuestionPayload, JudgeAnswerPayload, ServerMessage, StartCountdownPayload,
    UpdateScorePayload,
};
use crate::state::AppState;
use crate::types::Identity;

pub async fn handle_ask_question(
    state: &Arc<AppState>,
    identity: &Identity,
    payload: AskQuestionPayload,
) -> Option<ServerMessage> {
    tracing::info!("Moderator asking {:?} question: {}", payload.kind, payload.text);
    apply_as_moderator(state, identity, "ask_question", |game| {
        game.ask_question(payload, Utc::now())
    })
    .await
}

pub async fn handle_end_round(state: &Arc<AppState>, identity: &Identity) -> Option<ServerMessage> {
    tracing::info!("Moderator ending round");
    apply_as_moderator(state, identity, "end_round", |game| game.end_round()).await
}

pub async fn handle_judge_answer(
    state: &Arc<AppState>,
    identity: &Identity,
    payload: JudgeAnswerPayload,
) -> Option<ServerMessage> {
    tracing::info!(
        "Moderator judging {}: accept={}",
        payload.player_name,
        payload.accept
    );
    apply_as_moderator(state, identity, "judge_answer", |game| {
        game.judge_answer(payload, Utc::now())
    })
    .await
}

pub async fn handle_start_countdown(
    state: &Arc<AppState>,
    identity: &Identity,
    payload: StartCountdownPayload,
) -> Option<ServerMessage> {
    tracing::info!("Moderator starting {}s countdown", payload.seconds);
    apply_as_moderator(state, identity, "start_countdown", |game| {
        game.start_countdown(payload.seconds, Utc::now())
    })
    .await
}

pub async fn handle_reset_game(state: &Arc<AppState>, identity: &Identity) -> Option<ServerMessage> {
    tracing::info!("Moderator resetting game");
    apply_as_moderator(state, identity, "reset_game", |game| game.reset_game()).await
}

pub async fn handle_update_score(
    state: &Arc<AppState>,
    identity: &Identity,
    payload: UpdateScorePayload,
) -> Option<ServerMessage> {
    tracing::info!(
        "Moderator setting score of {} to {}",
        payload.player_name,
        payload.score
    );
    apply_as_moderator(state, identity, "update_score", |game| {
        game.update_score(payload)
    })
    .await
}
