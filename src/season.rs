//! Season Engine (spec.md §4.4): owns the schedule and team records, accepts
//! game results, and decides when the regular season yields to the
//! postseason.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::playoff::PlayoffEngine;
use crate::schedule::{self, Matchup};
use crate::team::Team;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Scheduled,
    InProgress,
    Completed,
    Postponed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledGame {
    pub game_id: String,
    pub home: String,
    pub away: String,
    pub week: u8,
    pub status: GameStatus,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub overtime: Option<bool>,
    pub game_duration: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonPhase {
    Preseason,
    RegularSeason,
    Playoffs,
    Offseason,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamRecord {
    pub team_id: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: u32,
    pub points_against: u32,
    pub division_wins: u32,
    pub division_losses: u32,
    pub conference_wins: u32,
    pub conference_losses: u32,
}

impl TeamRecord {
    pub fn new(team_id: impl Into<String>) -> Self {
        Self { team_id: team_id.into(), ..Default::default() }
    }

    pub fn games_played(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    pub fn win_percentage(&self) -> f64 {
        let played = self.games_played();
        if played == 0 {
            0.0
        } else {
            (f64::from(self.wins) + 0.5 * f64::from(self.ties)) / f64::from(played)
        }
    }

    pub fn point_differential(&self) -> i64 {
        i64::from(self.points_for) - i64::from(self.points_against)
    }
}

/// Comparator for spec.md §4.4's standings sort: win percentage desc, point
/// differential desc, then `tiebreak_wins` (division or conference wins,
/// chosen by the caller) desc, then abbreviation asc as the final,
/// implementation-stable tiebreak.
pub(crate) fn compare_records(a: &TeamRecord, a_abbr: &str, a_tiebreak: u32, b: &TeamRecord, b_abbr: &str, b_tiebreak: u32) -> std::cmp::Ordering {
    b.win_percentage()
        .partial_cmp(&a.win_percentage())
        .unwrap_or(std::cmp::Ordering::Equal)
        .then_with(|| b.point_differential().cmp(&a.point_differential()))
        .then_with(|| b_tiebreak.cmp(&a_tiebreak))
        .then_with(|| a_abbr.cmp(b_abbr))
}

pub struct SeasonEngine {
    teams: Vec<Team>,
    games: Vec<ScheduledGame>,
    records: HashMap<String, TeamRecord>,
    year: u32,
    pub current_week: u8,
    pub current_phase: SeasonPhase,
    playoff_engine: Option<PlayoffEngine>,
}

impl SeasonEngine {
    /// Generates the schedule (spec.md §4.3) and initializes empty
    /// `TeamRecord`s for every team.
    pub fn new(teams: Vec<Team>, year: u32, seed: Option<u32>) -> SimResult<Self> {
        let weeks = schedule::generate_schedule(&teams, seed)?;
        let mut games = Vec::new();
        let mut game_counter = 0u32;
        for (week_index, week_games) in weeks.into_iter().enumerate() {
            let week = (week_index + 1) as u8;
            for Matchup { home, away } in week_games {
                game_counter += 1;
                games.push(ScheduledGame {
                    game_id: format!("g{game_counter}"),
                    home: teams[home].team_id.clone(),
                    away: teams[away].team_id.clone(),
                    week,
                    status: GameStatus::Scheduled,
                    home_score: None,
                    away_score: None,
                    overtime: None,
                    game_duration: None,
                });
            }
        }

        let records = teams.iter().map(|t| (t.team_id.clone(), TeamRecord::new(t.team_id.clone()))).collect();

        Ok(Self {
            teams,
            games,
            records,
            year,
            current_week: 1,
            current_phase: SeasonPhase::RegularSeason,
            playoff_engine: None,
        })
    }

    pub fn get_week_games(&self, week: u8) -> SimResult<Vec<ScheduledGame>> {
        if !(1..=22).contains(&week) {
            return Err(SimError::InvalidArgument(format!("week {week} out of range 1..22")));
        }
        Ok(self.games.iter().filter(|g| g.week == week).cloned().collect())
    }

    pub fn get_next_games(&self, n: usize) -> Vec<ScheduledGame> {
        self.games
            .iter()
            .filter(|g| g.status == GameStatus::Scheduled)
            .take(n)
            .cloned()
            .collect()
    }

    fn team(&self, team_id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.team_id == team_id)
    }

    /// Marks a game Completed and recomputes records via a full replay
    /// (spec.md §4.4: "the canonical `recalculate_records()` ... is the
    /// source of truth after any state transition that may invalidate
    /// incremental updates").
    pub fn process_game_result(
        &mut self,
        game_id: &str,
        home_score: u32,
        away_score: u32,
        overtime: Option<bool>,
        duration: Option<u32>,
    ) -> SimResult<()> {
        let game = self
            .games
            .iter_mut()
            .find(|g| g.game_id == game_id)
            .ok_or_else(|| SimError::NotFound(format!("no scheduled game with id {game_id}")))?;

        if game.status == GameStatus::Completed {
            return Err(SimError::Conflict(format!("game {game_id} is already completed")));
        }

        game.status = GameStatus::Completed;
        game.home_score = Some(home_score);
        game.away_score = Some(away_score);
        game.overtime = overtime;
        game.game_duration = duration;

        self.recalculate_records()?;

        let completed_week = self.games.iter().filter(|g| g.week == self.current_week).all(|g| g.status == GameStatus::Completed);
        if completed_week {
            self.advance_week();
        }

        Ok(())
    }

    fn advance_week(&mut self) {
        self.current_week += 1;
        if self.current_week > schedule::TOTAL_WEEKS {
            self.current_phase = SeasonPhase::Playoffs;
            self.playoff_engine = PlayoffEngine::from_records(&self.teams, &self.records, self.year).ok();
        }
    }

    /// Replays every completed game from scratch (spec.md §4.4/§9: "replay
    /// over incremental update"). Idempotent: calling twice in a row yields
    /// identical records.
    ///
    /// Cross-checks the rebuilt records against each team's own completed
    /// game count before adopting them: a mismatch means a completed game
    /// was attributed to the wrong team or dropped entirely, an internal
    /// invariant violation (spec.md §7's `Unreachable`), not a caller error.
    pub fn recalculate_records(&mut self) -> SimResult<()> {
        let mut records: HashMap<String, TeamRecord> =
            self.teams.iter().map(|t| (t.team_id.clone(), TeamRecord::new(t.team_id.clone()))).collect();

        for game in self.games.iter().filter(|g| g.status == GameStatus::Completed) {
            let (Some(h), Some(a)) = (game.home_score, game.away_score) else { continue };
            let home_team = self.team(&game.home);
            let away_team = self.team(&game.away);
            let (Some(home_team), Some(away_team)) = (home_team, away_team) else { continue };

            let same_division = home_team.conference == away_team.conference && home_team.division == away_team.division;
            let same_conference = home_team.conference == away_team.conference;

            {
                let home_record = records.get_mut(&game.home).expect("home team has a record");
                home_record.points_for += h;
                home_record.points_against += a;
            }
            {
                let away_record = records.get_mut(&game.away).expect("away team has a record");
                away_record.points_for += a;
                away_record.points_against += h;
            }

            use std::cmp::Ordering::*;
            match h.cmp(&a) {
                Greater => {
                    let home_record = records.get_mut(&game.home).expect("home team has a record");
                    home_record.wins += 1;
                    if same_division {
                        home_record.division_wins += 1;
                    }
                    if same_conference {
                        home_record.conference_wins += 1;
                    }
                    let away_record = records.get_mut(&game.away).expect("away team has a record");
                    away_record.losses += 1;
                    if same_division {
                        away_record.division_losses += 1;
                    }
                    if same_conference {
                        away_record.conference_losses += 1;
                    }
                }
                Less => {
                    let away_record = records.get_mut(&game.away).expect("away team has a record");
                    away_record.wins += 1;
                    if same_division {
                        away_record.division_wins += 1;
                    }
                    if same_conference {
                        away_record.conference_wins += 1;
                    }
                    let home_record = records.get_mut(&game.home).expect("home team has a record");
                    home_record.losses += 1;
                    if same_division {
                        home_record.division_losses += 1;
                    }
                    if same_conference {
                        home_record.conference_losses += 1;
                    }
                }
                Equal => {
                    records.get_mut(&game.home).expect("home team has a record").ties += 1;
                    records.get_mut(&game.away).expect("away team has a record").ties += 1;
                }
            }
        }

        for team in &self.teams {
            let expected_games = self
                .games
                .iter()
                .filter(|g| g.status == GameStatus::Completed && (g.home == team.team_id || g.away == team.team_id))
                .count() as u32;
            let record = records.get(&team.team_id).expect("every team has a record entry");
            if record.games_played() != expected_games {
                return Err(SimError::Unreachable(format!(
                    "record replay disagreement for {}: rebuilt {} games played, {} completed games in schedule",
                    team.team_id,
                    record.games_played(),
                    expected_games
                )));
            }
        }

        self.records = records;
        Ok(())
    }

    /// Standings within a division (`by_division=true`) or conference,
    /// sorted descending per spec.md §4.4.
    pub fn get_standings(&self, by_division: bool) -> Vec<(Team, TeamRecord)> {
        let mut pairs: Vec<(Team, TeamRecord)> = self
            .teams
            .iter()
            .map(|t| (t.clone(), self.records.get(&t.team_id).cloned().unwrap_or_else(|| TeamRecord::new(t.team_id.clone()))))
            .collect();

        pairs.sort_by(|(team_a, record_a), (team_b, record_b)| {
            let tiebreak_a = if by_division { record_a.division_wins } else { record_a.conference_wins };
            let tiebreak_b = if by_division { record_b.division_wins } else { record_b.conference_wins };
            compare_records(record_a, &team_a.abbreviation, tiebreak_a, record_b, &team_b.abbreviation, tiebreak_b)
        });
        pairs
    }

    /// The current replayed records, keyed by team id — the snapshot the
    /// Playoff Engine is seeded from (spec.md §4.5).
    pub fn records(&self) -> &HashMap<String, TeamRecord> {
        &self.records
    }

    /// The season year the schedule and bracket are stamped with.
    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn get_playoff_bracket(&mut self) -> SimResult<&PlayoffEngine> {
        if self.playoff_engine.is_none() {
            self.playoff_engine = Some(PlayoffEngine::from_records(&self.teams, &self.records, self.year)?);
        }
        Ok(self.playoff_engine.as_ref().expect("constructed just above"))
    }

    pub fn get_playoff_picture(&self) -> Vec<(Team, TeamRecord)> {
        self.get_standings(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::nfl_teams;

    #[test]
    fn new_season_has_18_weeks_of_scheduled_games() {
        let season = SeasonEngine::new(nfl_teams(), 2024, Some(7)).unwrap();
        for week in 1..=18 {
            assert!(!season.get_week_games(week).unwrap().is_empty() || week > 1);
        }
    }

    #[test]
    fn recalculate_records_is_idempotent() {
        let mut season = SeasonEngine::new(nfl_teams(), 2024, Some(7)).unwrap();
        let week1_games = season.get_week_games(1).unwrap();
        for game in &week1_games {
            season.process_game_result(&game.game_id, 24, 17, Some(false), Some(60)).unwrap();
        }

        let before: Vec<_> = season.get_standings(true);
        season.recalculate_records().unwrap();
        let after: Vec<_> = season.get_standings(true);

        for ((_, a), (_, b)) in before.iter().zip(after.iter()) {
            assert_eq!(a.wins, b.wins);
            assert_eq!(a.points_for, b.points_for);
        }
    }

    #[test]
    fn completing_a_game_increments_games_played_by_one() {
        let mut season = SeasonEngine::new(nfl_teams(), 2024, Some(3)).unwrap();
        let game = season.get_week_games(1).unwrap()[0].clone();
        let home_before = season.records.get(&game.home).cloned().unwrap_or_default();

        season.process_game_result(&game.game_id, 20, 10, Some(false), Some(60)).unwrap();

        let home_after = season.records.get(&game.home).cloned().unwrap();
        assert_eq!(home_after.games_played(), home_before.games_played() + 1);
    }

    #[test]
    fn completing_an_already_completed_game_is_a_conflict() {
        let mut season = SeasonEngine::new(nfl_teams(), 2024, Some(3)).unwrap();
        let game = season.get_week_games(1).unwrap()[0].clone();
        season.process_game_result(&game.game_id, 20, 10, Some(false), Some(60)).unwrap();
        let result = season.process_game_result(&game.game_id, 20, 10, Some(false), Some(60));
        assert!(matches!(result, Err(SimError::Conflict(_))));
    }

    /// spec.md §8 scenario 4: replay the first 4 weeks into a season, then
    /// compare its records against a fresh engine fed the exact same games
    /// in the exact same order — they must end up identical.
    #[test]
    fn replaying_the_same_games_into_a_fresh_engine_matches_records() {
        let mut season_a = SeasonEngine::new(nfl_teams(), 2024, Some(11)).unwrap();
        let mut season_b = SeasonEngine::new(nfl_teams(), 2024, Some(11)).unwrap();

        let mut played = Vec::new();
        for week in 1..=4u8 {
            for game in season_a.get_week_games(week).unwrap() {
                let home_score = 17 + (game.game_id.len() as u32 % 10);
                let away_score = 10 + (game.week as u32 % 7);
                played.push((game.game_id.clone(), home_score, away_score));
            }
        }

        for (game_id, home_score, away_score) in &played {
            season_a.process_game_result(game_id, *home_score, *away_score, Some(false), Some(60)).unwrap();
        }
        for (game_id, home_score, away_score) in &played {
            season_b.process_game_result(game_id, *home_score, *away_score, Some(false), Some(60)).unwrap();
        }

        let standings_a = season_a.get_standings(true);
        let standings_b = season_b.get_standings(true);
        for ((team_a, record_a), (team_b, record_b)) in standings_a.iter().zip(standings_b.iter()) {
            assert_eq!(team_a.team_id, team_b.team_id);
            assert_eq!(record_a.wins, record_b.wins);
            assert_eq!(record_a.losses, record_b.losses);
            assert_eq!(record_a.points_for, record_b.points_for);
            assert_eq!(record_a.points_against, record_b.points_against);
        }
    }
}
