mod answer;
mod registry;
mod round;
mod score;
mod vote;

pub use registry::Admission;

use crate::broadcast;
use crate::error::{GameError, RegistrationError};
use crate::protocol::{GameSnapshot, RegisterPayload, ServerMessage};
use crate::session::SessionHandle;
use crate::types::*;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Shortest countdown a moderator may start
pub const MIN_COUNTDOWN_SECS: i64 = 5;

/// The single source of truth for a trivia session
#[derive(Debug, Default)]
pub struct GameState {
    pub current_question: Option<Question>,
    pub round: u32,
    pub round_ended: bool,
    /// Advisory only; nothing fires when it passes
    pub countdown_end_time: Option<DateTime<Utc>>,
    pub players: BTreeMap<PlayerName, Player>,
    /// Players whose connection dropped, kept for reconnection
    pub disconnected: BTreeMap<PlayerName, Player>,
    pub answers: BTreeMap<PlayerName, Vec<Answer>>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub moderator: Option<SessionHandle>,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Shared application state
///
/// Every mutation runs under the write lock together with the broadcast that
/// follows it, so all sessions observe snapshots in the same order.
#[derive(Debug, Default)]
pub struct AppState {
    game: RwLock<GameState>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a mutation and broadcast the resulting snapshot.
    /// A rejected mutation leaves state untouched and broadcasts nothing.
    pub async fn mutate<F>(&self, op: F) -> Result<(), GameError>
    where
        F: FnOnce(&mut GameState) -> Result<(), GameError>,
    {
        let mut game = self.game.write().await;
        op(&mut *game)?;
        broadcast::broadcast_game_state(&game);
        Ok(())
    }

    /// Run a read-only query against the current state
    pub async fn read<R>(&self, query: impl FnOnce(&GameState) -> R) -> R {
        query(&*self.game.read().await)
    }

    pub async fn snapshot(&self) -> GameSnapshot {
        self.read(|game| GameSnapshot::from(game)).await
    }

    /// Admit a freshly connected session as moderator or player
    pub async fn register(
        &self,
        registration: &RegisterPayload,
        session: SessionHandle,
    ) -> Result<Identity, RegistrationError> {
        let mut game = self.game.write().await;
        let identity = Identity {
            role: if registration.is_mod {
                Role::Moderator
            } else {
                Role::Player
            },
            name: registration.name.clone(),
            session_id: session.id(),
        };

        if registration.is_mod {
            if let Some(previous) = game.admit_moderator(session) {
                tracing::info!("Moderator session {} replaced", previous.id());
                let notice = ServerMessage::error("Replaced by a new moderator connection");
                if let Err(e) = previous.send(&notice) {
                    tracing::debug!("Could not notify replaced moderator: {}", e);
                }
            }
            tracing::info!("Moderator {} registered", identity.name);
        } else {
            match game.admit_player(&registration.name, session)? {
                Admission::Reconnected => {
                    tracing::info!("Player {} reconnected", identity.name)
                }
                Admission::NewPlayer => tracing::info!("Player {} registered", identity.name),
            }
        }

        broadcast::broadcast_game_state(&game);
        Ok(identity)
    }

    /// Detach a closed session. Players keep their score for a later reconnect.
    pub async fn disconnect(&self, identity: &Identity) {
        let mut game = self.game.write().await;
        if !game.release(identity) {
            tracing::debug!(
                "Session {} for {} was no longer attached",
                identity.session_id,
                identity.name
            );
            return;
        }

        match identity.role {
            Role::Moderator => tracing::info!("Moderator {} disconnected", identity.name),
            Role::Player => {
                tracing::info!("Player {} disconnected", identity.name);
                broadcast::broadcast_game_state(&game);
            }
        }
    }
}
