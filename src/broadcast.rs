//! Snapshot fan-out
//!
//! One snapshot is encoded per mutation and the same frame is pushed to the
//! moderator and every active player. A failed push is logged and skipped.

use crate::protocol::{GameSnapshot, ServerMessage};
use crate::session::{Frame, SessionHandle};
use crate::state::GameState;
use crate::types::Player;

/// Push the current state to every live session
pub fn broadcast_game_state(game: &GameState) {
    let frame = match ServerMessage::GameState(GameSnapshot::from(game)).encode() {
        Ok(frame) => frame,
        Err(e) => {
            tracing::error!("Failed to encode game state: {}", e);
            return;
        }
    };

    if let Some(moderator) = &game.moderator {
        deliver(moderator, &frame, "moderator");
    }
    for player in game.players.values() {
        if let Some(session) = &player.session {
            deliver(session, &frame, &player.name);
        }
    }
}

/// Tell each connected player the game is about to be wiped
pub fn notify_reset<'a>(players: impl IntoIterator<Item = &'a Player>) {
    let notice = ServerMessage::Reset {};
    let frame = match notice.encode() {
        Ok(frame) => frame,
        Err(e) => {
            tracing::error!("Failed to encode reset notice: {}", e);
            return;
        }
    };

    for player in players {
        if let Some(session) = &player.session {
            deliver(session, &frame, &player.name);
        }
    }
}

fn deliver(session: &SessionHandle, frame: &Frame, recipient: &str) {
    if let Err(e) = session.send_frame(frame.clone()) {
        tracing::warn!("Broadcast to {} failed: {}", recipient, e);
    }
}
