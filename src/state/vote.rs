use super::GameState;
use crate::error::GameError;
use crate::protocol::VoteAnswerPayload;
use crate::types::*;

impl GameState {
    /// Record the caller's up/down vote on an answer once the round is over.
    /// A repeat vote replaces the voter's earlier one.
    pub fn vote_answer(
        &mut self,
        voter: &Identity,
        payload: VoteAnswerPayload,
    ) -> Result<(), GameError> {
        self.active_player(voter)?;
        if !self.round_ended {
            return Err(GameError::RoundInProgress);
        }

        let invalid_target = || GameError::InvalidVoteTarget {
            player: payload.target_player_name.clone(),
            index: payload.answer_index,
        };
        let index = usize::try_from(payload.answer_index).map_err(|_| invalid_target())?;
        let answer = self
            .answers
            .get_mut(&payload.target_player_name)
            .and_then(|history| history.get_mut(index))
            .ok_or_else(invalid_target)?;

        if let Some(previous) = answer.votes.insert(voter.name.clone(), payload.is_upvote) {
            answer.vote_score -= vote_weight(previous);
        }
        answer.vote_score += vote_weight(payload.is_upvote);
        Ok(())
    }
}

fn vote_weight(is_upvote: bool) -> i64 {
    if is_upvote {
        1
    } else {
        -1
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::protocol::AskQuestionPayload;

    fn vote(target: &str, index: i64, is_upvote: bool) -> VoteAnswerPayload {
        VoteAnswerPayload {
            target_player_name: target.to_string(),
            answer_index: index,
            is_upvote,
        }
    }

    /// Alice and Bob joined, Alice answered, round still open
    fn answered_round() -> (GameState, Identity, Identity) {
        let mut game = GameState::new();
        let (alice, _) = join(&mut game, "Alice");
        let (bob, _) = join(&mut game, "Bob");
        game.ask_question(
            AskQuestionPayload {
                text: "Best pizza topping?".to_string(),
                kind: QuestionKind::Text,
                image: None,
            },
            at(0),
        )
        .unwrap();
        game.submit_answer(&alice, "Pineapple".to_string(), at(1))
            .unwrap();
        (game, alice, bob)
    }

    #[test]
    fn test_vote_before_round_end_is_noop() {
        let (mut game, _alice, bob) = answered_round();

        let result = game.vote_answer(&bob, vote("Alice", 0, true));

        assert_eq!(result, Err(GameError::RoundInProgress));
        let answer = &game.answers["Alice"][0];
        assert_eq!(answer.vote_score, 0);
        assert!(answer.votes.is_empty());
    }

    #[test]
    fn test_vote_after_round_end() {
        let (mut game, _alice, bob) = answered_round();
        game.end_round().unwrap();

        game.vote_answer(&bob, vote("Alice", 0, false)).unwrap();

        let answer = &game.answers["Alice"][0];
        assert_eq!(answer.vote_score, -1);
        assert_eq!(answer.votes.get("Bob"), Some(&false));
    }

    #[test]
    fn test_revote_replaces_previous_vote() {
        let (mut game, _alice, bob) = answered_round();
        game.end_round().unwrap();

        game.vote_answer(&bob, vote("Alice", 0, true)).unwrap();
        game.vote_answer(&bob, vote("Alice", 0, false)).unwrap();
        assert_eq!(game.answers["Alice"][0].vote_score, -1);

        game.vote_answer(&bob, vote("Alice", 0, true)).unwrap();
        game.vote_answer(&bob, vote("Alice", 0, true)).unwrap();
        let answer = &game.answers["Alice"][0];
        assert_eq!(answer.vote_score, 1);
        assert_eq!(answer.votes.len(), 1);
    }

    #[test]
    fn test_votes_from_different_players_accumulate() {
        let (mut game, alice, bob) = answered_round();
        game.end_round().unwrap();

        game.vote_answer(&bob, vote("Alice", 0, true)).unwrap();
        game.vote_answer(&alice, vote("Alice", 0, true)).unwrap();

        assert_eq!(game.answers["Alice"][0].vote_score, 2);
    }

    #[test]
    fn test_invalid_vote_targets() {
        let (mut game, _alice, bob) = answered_round();
        game.end_round().unwrap();

        for (target, index) in [("Alice", 1), ("Alice", -1), ("Carol", 0)] {
            let result = game.vote_answer(&bob, vote(target, index, true));
            assert_eq!(
                result,
                Err(GameError::InvalidVoteTarget {
                    player: target.to_string(),
                    index,
                })
            );
        }
        assert_eq!(game.answers["Alice"][0].vote_score, 0);
    }
}
