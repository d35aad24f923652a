//! Player message handlers

use chrono::Utc;
use std::sync::Arc;

use super::handlers::apply;
use crate::protocol::{ServerMessage, SubmitAnswerPayload, VoteAnswerPayload};
use crate::state::AppState;
use crate::types::Identity;

pub async fn handle_submit_answer(
    state: &Arc<AppState>,
    identity: &Identity,
    payload: SubmitAnswerPayload,
) -> Option<ServerMessage> {
    tracing::info!("Answer submitted by {}: {}", identity.name, payload.text);
    apply(state, "submit_answer", |game| {
        game.submit_answer(identity, payload.text, Utc::now())
    })
    .await
}

pub async fn handle_vote_answer(
    state: &Arc<AppState>,
    identity: &Identity,
    payload: VoteAnswerPayload,
) -> Option<ServerMessage> {
    tracing::info!(
        "Vote from {} on {}#{}: upvote={}",
        identity.name,
        payload.target_player_name,
        payload.answer_index,
        payload.is_upvote
    );
    apply(state, "vote_answer", |game| game.vote_answer(identity, payload)).await
}
