//! `GameRepository` boundary (spec.md §6): read-only lookup of scheduled
//! games and result persistence after simulation, kept narrow and
//! value-oriented so the core never depends on when persistence completes.
//! The core itself performs no blocking I/O (spec.md §5), so this boundary
//! is synchronous like `TeamRepository`; the reference binary's own I/O is
//! plain stdin/stdout and needs no async runtime either.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::game::types::{DriveLog, PlayLogEntry, TeamStatsPair};
use crate::season::ScheduledGame;
use crate::weather::Weather;

/// The fields `save_result` persists for a completed game.
#[derive(Debug, Clone)]
pub struct GameResultRecord {
    pub home_score: u32,
    pub away_score: u32,
    pub winner_id: Option<String>,
    pub weather: Weather,
    pub drives: Vec<DriveLog>,
    pub play_by_play: Vec<PlayLogEntry>,
    pub team_stats: TeamStatsPair,
    pub overtime: bool,
    pub duration: u32,
}

pub trait GameRepository {
    fn get(&self, game_id: &str) -> Option<ScheduledGame>;
    fn save_result(&self, game_id: &str, result: GameResultRecord);
}

/// Thread-safe in-memory `GameRepository`, grounded on the teacher's
/// `Arc<RwLock<HashMap<..>>>` active-game store.
#[derive(Clone, Default)]
pub struct InMemoryGameRepository {
    games: Arc<RwLock<HashMap<String, ScheduledGame>>>,
}

impl InMemoryGameRepository {
    pub fn new(games: Vec<ScheduledGame>) -> Self {
        let map = games.into_iter().map(|g| (g.game_id.clone(), g)).collect();
        Self { games: Arc::new(RwLock::new(map)) }
    }

    pub fn replace_all(&self, games: Vec<ScheduledGame>) {
        let mut guard = self.games.write().expect("game repository lock poisoned");
        *guard = games.into_iter().map(|g| (g.game_id.clone(), g)).collect();
    }

    pub fn list(&self) -> Vec<ScheduledGame> {
        self.games.read().expect("game repository lock poisoned").values().cloned().collect()
    }
}

impl GameRepository for InMemoryGameRepository {
    fn get(&self, game_id: &str) -> Option<ScheduledGame> {
        self.games.read().expect("game repository lock poisoned").get(game_id).cloned()
    }

    fn save_result(&self, game_id: &str, result: GameResultRecord) {
        let mut guard = self.games.write().expect("game repository lock poisoned");
        if let Some(game) = guard.get_mut(game_id) {
            game.status = crate::season::GameStatus::Completed;
            game.home_score = Some(result.home_score);
            game.away_score = Some(result.away_score);
            game.overtime = Some(result.overtime);
            game.game_duration = Some(result.duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::season::GameStatus;

    fn sample_game() -> ScheduledGame {
        ScheduledGame {
            game_id: "g1".to_string(),
            home: "kc".to_string(),
            away: "buf".to_string(),
            week: 1,
            status: GameStatus::Scheduled,
            home_score: None,
            away_score: None,
            overtime: None,
            game_duration: None,
        }
    }

    #[test]
    fn save_result_marks_game_completed() {
        let repo = InMemoryGameRepository::new(vec![sample_game()]);
        assert!(repo.get("g1").is_some());
        assert!(repo.get("missing").is_none());

        let record = GameResultRecord {
            home_score: 24,
            away_score: 20,
            winner_id: Some("kc".to_string()),
            weather: Weather::clear_default(),
            drives: Vec::new(),
            play_by_play: Vec::new(),
            team_stats: TeamStatsPair {
                home: Default::default(),
                away: Default::default(),
            },
            overtime: false,
            duration: 60,
        };
        repo.save_result("g1", record);

        let saved = repo.get("g1").unwrap();
        assert_eq!(saved.status, GameStatus::Completed);
        assert_eq!(saved.home_score, Some(24));
    }
}
