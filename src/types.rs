use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::session::{SessionHandle, SessionId};

/// Player display names double as identity keys
pub type PlayerName = String;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    #[default]
    Text,
    Number,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    /// Base64 encoded image data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub asked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnswerStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub player_name: PlayerName,
    pub text: String,
    pub status: AnswerStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judged_at: Option<DateTime<Utc>>,
    /// voter name -> true for upvote, false for downvote
    pub votes: BTreeMap<PlayerName, bool>,
    /// Upvotes minus downvotes
    pub vote_score: i64,
}

impl Answer {
    pub fn pending(player_name: PlayerName, text: String, submitted_at: DateTime<Utc>) -> Self {
        Self {
            player_name,
            text,
            status: AnswerStatus::Pending,
            submitted_at,
            judged_at: None,
            votes: BTreeMap::new(),
            vote_score: 0,
        }
    }

    /// True while the moderator has not ruled on this answer
    pub fn is_judgeable(&self) -> bool {
        self.status == AnswerStatus::Pending && self.judged_at.is_none()
    }
}

/// A registered player. The session is absent while the player is disconnected.
#[derive(Debug, Clone)]
pub struct Player {
    pub name: PlayerName,
    pub score: u32,
    pub session: Option<SessionHandle>,
}

impl Player {
    pub fn new(name: PlayerName, session: SessionHandle) -> Self {
        Self {
            name,
            score: 0,
            session: Some(session),
        }
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(SessionHandle::id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub player_name: PlayerName,
    pub score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Moderator,
    Player,
}

/// Who a connection registered as, fixed for the connection's lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub role: Role,
    pub name: PlayerName,
    pub session_id: SessionId,
}

impl Identity {
    pub fn is_moderator(&self) -> bool {
        self.role == Role::Moderator
    }
}
