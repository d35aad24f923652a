use super::GameState;
use crate::error::GameError;
use crate::protocol::UpdateScorePayload;
use crate::types::*;
use std::collections::BTreeMap;

impl GameState {
    /// Find a player by name, active first, then among the disconnected
    pub(super) fn lookup_player<'a>(
        players: &'a mut BTreeMap<PlayerName, Player>,
        disconnected: &'a mut BTreeMap<PlayerName, Player>,
        name: &str,
    ) -> Option<&'a mut Player> {
        match players.get_mut(name) {
            Some(player) => Some(player),
            None => disconnected.get_mut(name),
        }
    }

    /// Moderator override of a player's score
    pub fn update_score(&mut self, payload: UpdateScorePayload) -> Result<(), GameError> {
        let name = payload.player_name;
        let player = Self::lookup_player(&mut self.players, &mut self.disconnected, &name)
            .ok_or_else(|| GameError::UnknownPlayer(name.clone()))?;
        if payload.score < 0 {
            return Err(GameError::NegativeScore(payload.score));
        }
        let score =
            u32::try_from(payload.score).map_err(|_| GameError::ScoreOutOfRange(payload.score))?;

        player.score = score;
        self.recompute_leaderboard();
        Ok(())
    }

    /// Rebuild the leaderboard from the active players, highest score first.
    /// Ties are ordered by name.
    pub fn recompute_leaderboard(&mut self) {
        let mut leaderboard: Vec<LeaderboardEntry> = self
            .players
            .values()
            .map(|p| LeaderboardEntry {
                player_name: p.name.clone(),
                score: p.score,
            })
            .collect();
        leaderboard.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.player_name.cmp(&b.player_name))
        });
        self.leaderboard = leaderboard;
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn set_score(name: &str, score: i64) -> UpdateScorePayload {
        UpdateScorePayload {
            player_name: name.to_string(),
            score,
        }
    }

    fn names(game: &GameState) -> Vec<&str> {
        game.leaderboard
            .iter()
            .map(|e| e.player_name.as_str())
            .collect()
    }

    #[test]
    fn test_update_score_reorders_leaderboard() {
        let mut game = GameState::new();
        let _alice = join(&mut game, "Alice");
        let _bob = join(&mut game, "Bob");
        let _carol = join(&mut game, "Carol");

        game.update_score(set_score("Carol", 5)).unwrap();
        game.update_score(set_score("Alice", 2)).unwrap();

        assert_eq!(names(&game), vec!["Carol", "Alice", "Bob"]);
        assert_eq!(game.leaderboard[0].score, 5);
    }

    #[test]
    fn test_ties_are_ordered_by_name() {
        let mut game = GameState::new();
        let _zed = join(&mut game, "Zed");
        let _amy = join(&mut game, "Amy");

        game.recompute_leaderboard();

        assert_eq!(names(&game), vec!["Amy", "Zed"]);
    }

    #[test]
    fn test_negative_score_is_rejected() {
        let mut game = GameState::new();
        let _alice = join(&mut game, "Alice");
        game.update_score(set_score("Alice", 3)).unwrap();

        let result = game.update_score(set_score("Alice", -1));

        assert_eq!(result, Err(GameError::NegativeScore(-1)));
        assert_eq!(game.players["Alice"].score, 3);
    }

    #[test]
    fn test_oversized_score_is_out_of_range() {
        let mut game = GameState::new();
        let _alice = join(&mut game, "Alice");
        game.update_score(set_score("Alice", 3)).unwrap();

        let result = game.update_score(set_score("Alice", 5_000_000_000));

        assert_eq!(result, Err(GameError::ScoreOutOfRange(5_000_000_000)));
        assert_eq!(game.players["Alice"].score, 3);
        assert!(game.update_score(set_score("Alice", i64::from(u32::MAX))).is_ok());
    }

    #[test]
    fn test_unknown_player_is_rejected() {
        let mut game = GameState::new();

        let result = game.update_score(set_score("Ghost", 3));

        assert_eq!(result, Err(GameError::UnknownPlayer("Ghost".to_string())));
        assert!(game.leaderboard.is_empty());
    }

    #[test]
    fn test_leaderboard_has_one_entry_per_active_player() {
        let mut game = GameState::new();
        let (alice, _rx) = join(&mut game, "Alice");
        let _bob = join(&mut game, "Bob");
        game.update_score(set_score("Alice", 9)).unwrap();

        game.release(&alice);

        assert_eq!(names(&game), vec!["Bob"]);
        game.update_score(set_score("Alice", 10)).unwrap();
        assert_eq!(names(&game), vec!["Bob"]);
        assert_eq!(game.disconnected["Alice"].score, 10);
    }
}
