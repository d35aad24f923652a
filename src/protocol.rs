use crate::error::ProtocolError;
use crate::session::Frame;
use crate::state::GameState;
use crate::types::*;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw inbound envelope: `{type, payload}`
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Register(RegisterPayload),
    Ping,
    // Moderator-only messages
    AskQuestion(AskQuestionPayload),
    EndRound,
    JudgeAnswer(JudgeAnswerPayload),
    StartCountdown(StartCountdownPayload),
    ResetGame,
    UpdateScore(UpdateScorePayload),
    // Player-only messages
    SubmitAnswer(SubmitAnswerPayload),
    VoteAnswer(VoteAnswerPayload),
}

impl ClientMessage {
    /// Decode a text frame into a typed message
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(text)?;
        Self::from_envelope(envelope)
    }

    pub fn from_envelope(envelope: Envelope) -> Result<Self, ProtocolError> {
        let Envelope { kind, payload } = envelope;
        let msg = match kind.as_str() {
            "register" => Self::Register(decode_payload(&kind, payload)?),
            "ping" => Self::Ping,
            "ask_question" => Self::AskQuestion(decode_payload(&kind, payload)?),
            "end_round" => Self::EndRound,
            "judge_answer" => Self::JudgeAnswer(decode_payload(&kind, payload)?),
            "start_countdown" => Self::StartCountdown(decode_payload(&kind, payload)?),
            "reset_game" => Self::ResetGame,
            "update_score" => Self::UpdateScore(decode_payload(&kind, payload)?),
            "submit_answer" => Self::SubmitAnswer(decode_payload(&kind, payload)?),
            "vote_answer" => Self::VoteAnswer(decode_payload(&kind, payload)?),
            _ => return Err(ProtocolError::UnknownType(kind)),
        };
        Ok(msg)
    }

    /// The wire tag this message was decoded from
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Register(_) => "register",
            Self::Ping => "ping",
            Self::AskQuestion(_) => "ask_question",
            Self::EndRound => "end_round",
            Self::JudgeAnswer(_) => "judge_answer",
            Self::StartCountdown(_) => "start_countdown",
            Self::ResetGame => "reset_game",
            Self::UpdateScore(_) => "update_score",
            Self::SubmitAnswer(_) => "submit_answer",
            Self::VoteAnswer(_) => "vote_answer",
        }
    }
}

fn decode_payload<T: DeserializeOwned>(
    kind: &str,
    payload: serde_json::Value,
) -> Result<T, ProtocolError> {
    serde_json::from_value(payload).map_err(|source| ProtocolError::Payload {
        kind: kind.to_string(),
        source,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    pub name: String,
    #[serde(default)]
    pub is_mod: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AskQuestionPayload {
    pub text: String,
    #[serde(rename = "type", default)]
    pub kind: QuestionKind,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JudgeAnswerPayload {
    pub player_name: PlayerName,
    #[serde(default)]
    pub round: u32,
    pub accept: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StartCountdownPayload {
    pub seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScorePayload {
    pub player_name: PlayerName,
    pub score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmitAnswerPayload {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoteAnswerPayload {
    pub target_player_name: PlayerName,
    pub answer_index: i64,
    pub is_upvote: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full snapshot, sent on registration and after every mutation
    GameState(GameSnapshot),
    Pong,
    Error {
        message: String,
    },
    /// Sent to every player right before a game-wide reset drops them
    Reset {},
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn encode(&self) -> Result<Frame, serde_json::Error> {
        serde_json::to_string(self).map(Frame::from)
    }
}

/// The `game_state` payload UIs render from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_question: Option<Question>,
    pub players: BTreeMap<PlayerName, PlayerView>,
    pub answers: BTreeMap<PlayerName, Vec<Answer>>,
    pub leaderboard: Vec<LeaderboardEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countdown_end_time: Option<DateTime<Utc>>,
    pub round: u32,
    pub round_ended: bool,
}

/// Public view of an active player
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub name: PlayerName,
    pub score: u32,
    pub is_mod: bool,
}

impl From<&Player> for PlayerView {
    fn from(p: &Player) -> Self {
        Self {
            name: p.name.clone(),
            score: p.score,
            is_mod: false,
        }
    }
}

impl From<&GameState> for GameSnapshot {
    fn from(game: &GameState) -> Self {
        Self {
            current_question: game.current_question.clone(),
            players: game
                .players
                .iter()
                .map(|(name, p)| (name.clone(), PlayerView::from(p)))
                .collect(),
            answers: game.answers.clone(),
            leaderboard: game.leaderboard.clone(),
            countdown_end_time: game.countdown_end_time,
            round: game.round,
            round_ended: game.round_ended,
        }
    }
}
