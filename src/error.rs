//! Error types for the game core
//!
//! None of these are fatal: protocol errors drop a connection, game errors
//! turn a single mutation into a no-op, delivery errors are logged and forgotten.

use crate::session::SessionId;
use crate::state::MIN_COUNTDOWN_SECS;

/// Errors decoding an inbound envelope
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed envelope: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed `{kind}` payload: {source}")]
    Payload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown envelope type `{0}`")]
    UnknownType(String),
}

/// Errors admitting a connection
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("Name already taken")]
    NameTaken(String),
}

/// Reasons a mutation was rejected without touching state
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("no question has been asked")]
    NoActiveQuestion,

    #[error("round has already ended")]
    RoundEnded,

    #[error("voting opens once the round has ended")]
    RoundInProgress,

    #[error("player `{0}` not found")]
    UnknownPlayer(String),

    #[error("`{0}` is not an active player")]
    NotActive(String),

    #[error("`{0}` no longer holds the moderator seat")]
    NotModerator(String),

    #[error("player `{0}` has no answer to judge")]
    NoAnswer(String),

    #[error("latest answer from `{0}` was already judged")]
    AlreadyJudged(String),

    #[error("countdown of {0}s is below the {min}s minimum", min = MIN_COUNTDOWN_SECS)]
    CountdownTooShort(i64),

    #[error("countdown of {0}s is out of range")]
    CountdownTooLong(i64),

    #[error("score {0} must not be negative")]
    NegativeScore(i64),

    #[error("score {0} is out of range")]
    ScoreOutOfRange(i64),

    #[error("awarding a point to `{0}` would overflow their score")]
    ScoreOverflow(String),

    #[error("no answer #{index} from `{player}`")]
    InvalidVoteTarget { player: String, index: i64 },
}

/// Errors pushing a frame to a peer
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("session {0} is closed")]
    SessionClosed(SessionId),

    #[error("session {0} is not keeping up, frame dropped")]
    QueueFull(SessionId),

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}
