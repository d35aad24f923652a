use super::{GameState, MIN_COUNTDOWN_SECS};
use crate::broadcast;
use crate::error::GameError;
use crate::protocol::AskQuestionPayload;
use crate::types::*;
use chrono::{DateTime, Duration, Utc};

impl GameState {
    /// Start a new round with a fresh question
    pub fn ask_question(
        &mut self,
        payload: AskQuestionPayload,
        now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        self.current_question = Some(Question {
            text: payload.text,
            kind: payload.kind,
            image: payload.image.filter(|image| !image.is_empty()),
            asked_at: now,
        });
        self.round += 1;
        self.answers.clear();
        self.round_ended = false;
        Ok(())
    }

    /// Close submissions and open voting
    pub fn end_round(&mut self) -> Result<(), GameError> {
        self.round_ended = true;
        self.countdown_end_time = None;
        Ok(())
    }

    pub fn start_countdown(&mut self, seconds: i64, now: DateTime<Utc>) -> Result<(), GameError> {
        if seconds < MIN_COUNTDOWN_SECS {
            return Err(GameError::CountdownTooShort(seconds));
        }
        let deadline = Duration::try_seconds(seconds)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or(GameError::CountdownTooLong(seconds))?;
        self.countdown_end_time = Some(deadline);
        Ok(())
    }

    /// Wipe the game back to its initial state. Every connected player is told
    /// to reset before being dropped.
    pub fn reset_game(&mut self) -> Result<(), GameError> {
        broadcast::notify_reset(self.players.values());

        self.current_question = None;
        self.answers.clear();
        self.round = 0;
        self.countdown_end_time = None;
        self.round_ended = false;
        self.players.clear();
        self.disconnected.clear();
        self.leaderboard.clear();
        Ok(())
    }
}
