use super::GameState;
use crate::error::GameError;
use crate::protocol::JudgeAnswerPayload;
use crate::types::*;
use chrono::{DateTime, Utc};

/// Points awarded for an accepted answer
pub const POINTS_PER_CORRECT_ANSWER: u32 = 1;

impl GameState {
    /// Append a pending answer to the caller's history for this round.
    /// Players may answer more than once; judging acts on the latest.
    pub fn submit_answer(
        &mut self,
        identity: &Identity,
        text: String,
        now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        self.active_player(identity)?;
        if self.current_question.is_none() {
            return Err(GameError::NoActiveQuestion);
        }
        if self.round_ended {
            return Err(GameError::RoundEnded);
        }

        self.answers
            .entry(identity.name.clone())
            .or_default()
            .push(Answer::pending(identity.name.clone(), text, now));
        Ok(())
    }

    /// Rule on a player's most recent answer. Each answer is judged at most
    /// once, so a retried judgement cannot award a second point.
    pub fn judge_answer(
        &mut self,
        payload: JudgeAnswerPayload,
        now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        let name = payload.player_name;
        if payload.round != self.round {
            tracing::debug!(
                "Judgement for {} names round {} during round {}",
                name,
                payload.round,
                self.round
            );
        }

        let player = Self::lookup_player(&mut self.players, &mut self.disconnected, &name)
            .ok_or_else(|| GameError::UnknownPlayer(name.clone()))?;
        let answer = self
            .answers
            .get_mut(&name)
            .and_then(|history| history.last_mut())
            .ok_or_else(|| GameError::NoAnswer(name.clone()))?;
        if !answer.is_judgeable() {
            return Err(GameError::AlreadyJudged(name));
        }

        let status = if payload.accept {
            player.score = player
                .score
                .checked_add(POINTS_PER_CORRECT_ANSWER)
                .ok_or_else(|| GameError::ScoreOverflow(name.clone()))?;
            AnswerStatus::Accepted
        } else {
            AnswerStatus::Rejected
        };
        answer.status = status;
        answer.judged_at = Some(now);

        self.recompute_leaderboard();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::protocol::AskQuestionPayload;

    fn game_with_question() -> GameState {
        let mut game = GameState::new();
        game.ask_question(
            AskQuestionPayload {
                text: "2+2?".to_string(),
                kind: QuestionKind::Number,
                image: None,
            },
            at(0),
        )
        .unwrap();
        game
    }

    fn judge(name: &str, accept: bool) -> JudgeAnswerPayload {
        JudgeAnswerPayload {
            player_name: name.to_string(),
            round: 1,
            accept,
        }
    }

    #[test]
    fn test_submit_before_question_is_noop() {
        let mut game = GameState::new();
        let (alice, _rx) = join(&mut game, "Alice");

        let result = game.submit_answer(&alice, "4".to_string(), at(1));

        assert_eq!(result, Err(GameError::NoActiveQuestion));
        assert!(game.answers.is_empty());
    }

    #[test]
    fn test_submit_after_round_end_is_noop() {
        let mut game = game_with_question();
        let (alice, _rx) = join(&mut game, "Alice");
        game.end_round().unwrap();

        let result = game.submit_answer(&alice, "4".to_string(), at(1));

        assert_eq!(result, Err(GameError::RoundEnded));
        assert!(game.answers.is_empty());
    }

    #[test]
    fn test_submit_requires_active_player() {
        let mut game = game_with_question();
        let (alice, _rx) = join(&mut game, "Alice");
        game.release(&alice);

        let result = game.submit_answer(&alice, "4".to_string(), at(1));

        assert_eq!(result, Err(GameError::NotActive("Alice".to_string())));
        assert!(game.answers.is_empty());
    }

    #[test]
    fn test_resubmission_keeps_history() {
        let mut game = game_with_question();
        let (alice, _rx) = join(&mut game, "Alice");

        game.submit_answer(&alice, "5".to_string(), at(1)).unwrap();
        game.submit_answer(&alice, "4".to_string(), at(2)).unwrap();

        let history = &game.answers["Alice"];
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].text, "4");
        assert!(history.iter().all(|a| a.status == AnswerStatus::Pending));
        assert_eq!(history[0].submitted_at, at(1));
    }

    #[test]
    fn test_accept_awards_one_point() {
        let mut game = game_with_question();
        let (alice, _rx) = join(&mut game, "Alice");
        game.submit_answer(&alice, "4".to_string(), at(1)).unwrap();

        game.judge_answer(judge("Alice", true), at(5)).unwrap();

        let answer = &game.answers["Alice"][0];
        assert_eq!(answer.status, AnswerStatus::Accepted);
        assert_eq!(answer.judged_at, Some(at(5)));
        assert_eq!(game.players["Alice"].score, 1);
        assert_eq!(game.leaderboard[0].score, 1);
    }

    #[test]
    fn test_accept_at_max_score_changes_nothing() {
        let mut game = game_with_question();
        let (alice, _rx) = join(&mut game, "Alice");
        game.submit_answer(&alice, "4".to_string(), at(1)).unwrap();
        game.players.get_mut("Alice").unwrap().score = u32::MAX;

        let result = game.judge_answer(judge("Alice", true), at(5));

        assert_eq!(result, Err(GameError::ScoreOverflow("Alice".to_string())));
        let answer = &game.answers["Alice"][0];
        assert_eq!(answer.status, AnswerStatus::Pending);
        assert!(answer.judged_at.is_none());
        assert_eq!(game.players["Alice"].score, u32::MAX);

        // The answer can still be rejected
        game.judge_answer(judge("Alice", false), at(6)).unwrap();
        assert_eq!(game.answers["Alice"][0].status, AnswerStatus::Rejected);
    }

    #[test]
    fn test_duplicate_judgement_is_idempotent() {
        let mut game = game_with_question();
        let (alice, _rx) = join(&mut game, "Alice");
        game.submit_answer(&alice, "4".to_string(), at(1)).unwrap();

        game.judge_answer(judge("Alice", true), at(5)).unwrap();
        let second = game.judge_answer(judge("Alice", true), at(6));

        assert_eq!(second, Err(GameError::AlreadyJudged("Alice".to_string())));
        assert_eq!(game.players["Alice"].score, 1);
        assert_eq!(game.answers["Alice"][0].judged_at, Some(at(5)));
    }

    #[test]
    fn test_reject_awards_nothing() {
        let mut game = game_with_question();
        let (alice, _rx) = join(&mut game, "Alice");
        game.submit_answer(&alice, "5".to_string(), at(1)).unwrap();

        game.judge_answer(judge("Alice", false), at(5)).unwrap();

        assert_eq!(game.answers["Alice"][0].status, AnswerStatus::Rejected);
        assert_eq!(game.players["Alice"].score, 0);
    }

    #[test]
    fn test_judge_targets_latest_answer() {
        let mut game = game_with_question();
        let (alice, _rx) = join(&mut game, "Alice");
        game.submit_answer(&alice, "5".to_string(), at(1)).unwrap();
        game.submit_answer(&alice, "4".to_string(), at(2)).unwrap();

        game.judge_answer(judge("Alice", true), at(5)).unwrap();

        let history = &game.answers["Alice"];
        assert_eq!(history[0].status, AnswerStatus::Pending);
        assert_eq!(history[1].status, AnswerStatus::Accepted);
    }

    #[test]
    fn test_judge_unknown_player_or_missing_answer() {
        let mut game = game_with_question();
        let (_alice, _rx) = join(&mut game, "Alice");

        assert_eq!(
            game.judge_answer(judge("Nobody", true), at(5)),
            Err(GameError::UnknownPlayer("Nobody".to_string()))
        );
        assert_eq!(
            game.judge_answer(judge("Alice", true), at(5)),
            Err(GameError::NoAnswer("Alice".to_string()))
        );
        assert_eq!(game.players["Alice"].score, 0);
    }

    #[test]
    fn test_judge_disconnected_player_keeps_point_for_reconnect() {
        let mut game = game_with_question();
        let (alice, _rx) = join(&mut game, "Alice");
        game.submit_answer(&alice, "4".to_string(), at(1)).unwrap();
        game.release(&alice);

        game.judge_answer(judge("Alice", true), at(5)).unwrap();

        assert_eq!(game.disconnected["Alice"].score, 1);
        assert!(game.leaderboard.is_empty());
    }
}
