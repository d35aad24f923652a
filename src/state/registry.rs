//! Identity registry and reconnection policy
//!
//! A name maps to at most one active player. When a player's connection
//! closes the record moves to the disconnected set with its score intact,
//! and registering under the same name later picks it back up.

use super::GameState;
use crate::error::{GameError, RegistrationError};
use crate::session::SessionHandle;
use crate::types::*;

/// How a player registration was admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    NewPlayer,
    Reconnected,
}

impl GameState {
    /// Install a moderator session, returning the one it displaced
    pub fn admit_moderator(&mut self, session: SessionHandle) -> Option<SessionHandle> {
        self.moderator.replace(session)
    }

    pub fn admit_player(
        &mut self,
        name: &str,
        session: SessionHandle,
    ) -> Result<Admission, RegistrationError> {
        let admission = if let Some(mut player) = self.disconnected.remove(name) {
            player.session = Some(session);
            self.players.insert(name.to_string(), player);
            Admission::Reconnected
        } else if self.players.contains_key(name) {
            return Err(RegistrationError::NameTaken(name.to_string()));
        } else {
            self.players
                .insert(name.to_string(), Player::new(name.to_string(), session));
            Admission::NewPlayer
        };

        self.recompute_leaderboard();
        Ok(admission)
    }

    /// Detach the session behind `identity`. Returns false when that session
    /// is no longer the one attached (replaced moderator, player dropped by a reset).
    pub fn release(&mut self, identity: &Identity) -> bool {
        match identity.role {
            Role::Moderator => {
                let attached = self.moderator.as_ref().map(SessionHandle::id);
                if attached != Some(identity.session_id) {
                    return false;
                }
                self.moderator = None;
                true
            }
            Role::Player => {
                let attached = self
                    .players
                    .get(&identity.name)
                    .and_then(Player::session_id);
                if attached != Some(identity.session_id) {
                    return false;
                }
                if let Some(mut player) = self.players.remove(&identity.name) {
                    player.session = None;
                    self.disconnected.insert(identity.name.clone(), player);
                }
                self.recompute_leaderboard();
                true
            }
        }
    }

    /// Moderator commands only count from the session currently in the seat
    pub fn ensure_moderator(&self, identity: &Identity) -> Result<(), GameError> {
        let attached = self.moderator.as_ref().map(SessionHandle::id);
        if identity.role == Role::Moderator && attached == Some(identity.session_id) {
            Ok(())
        } else {
            Err(GameError::NotModerator(identity.name.clone()))
        }
    }

    /// The active player record behind a player identity
    pub fn active_player(&self, identity: &Identity) -> Result<&Player, GameError> {
        self.players
            .get(&identity.name)
            .filter(|p| p.session_id() == Some(identity.session_id))
            .ok_or_else(|| GameError::NotActive(identity.name.clone()))
    }
}
