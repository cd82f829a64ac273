//! Game Engine data types (spec.md §3): the play-by-play log, drive
//! summaries, per-team simulation stats, and the terminal `GameResult`.

use serde::{Deserialize, Serialize};

use crate::team::Team;
use crate::weather::Weather;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quarter {
    First,
    Second,
    Third,
    Fourth,
    Overtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Possession {
    Home,
    Away,
}

impl Possession {
    pub fn opponent(self) -> Possession {
        match self {
            Possession::Home => Possession::Away,
            Possession::Away => Possession::Home,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayType {
    Run,
    Pass,
    Turnover,
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveResult {
    Touchdown,
    FieldGoal,
    Turnover,
    TurnoverOnDowns,
    Punt,
    MissedFg,
    EndOfQuarter,
}

impl DriveResult {
    /// Points credited to the offense for this drive result.
    pub fn points(self) -> u8 {
        match self {
            DriveResult::Touchdown => 7,
            DriveResult::FieldGoal => 3,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayLogEntry {
    pub quarter: Quarter,
    pub down: u8,
    pub yards_to_go: u8,
    pub start_field: u8,
    pub end_field: u8,
    pub play_type: PlayType,
    pub yards_gained: i32,
    pub clock: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveLog {
    pub quarter: Quarter,
    pub drive_number: u32,
    pub offense_abbr: String,
    pub defense_abbr: String,
    pub start_field: u8,
    pub result: DriveResult,
    pub points: u8,
    pub time_elapsed: u32,
    pub plays: u32,
    pub play_log: Vec<PlayLogEntry>,
    pub final_play_description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownAttempts {
    pub attempts: u32,
    pub conversions: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSimulationStats {
    pub total_yards: i32,
    pub passing_yards: i32,
    pub rushing_yards: i32,
    pub turnovers: u32,
    pub plays: u32,
    pub time_of_possession: u32,
    pub third_down: DownAttempts,
    pub fourth_down: DownAttempts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub home: Team,
    pub away: Team,
    pub home_score: u32,
    pub away_score: u32,
    pub duration: u32,
    pub overtime: bool,
    pub winner_id: Option<String>,
    pub weather: Weather,
    pub summary: String,
    pub play_by_play: Vec<PlayLogEntry>,
    pub drives: Vec<DriveLog>,
    pub team_stats: TeamStatsPair,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStatsPair {
    pub home: TeamSimulationStats,
    pub away: TeamSimulationStats,
}

/// Formats elapsed seconds within a quarter as a countdown clock
/// `"MM:SS"`, matching spec.md §8's `[00:00, 15:00]` bound.
pub fn format_clock(seconds_remaining: u32) -> String {
    format!("{:02}:{:02}", seconds_remaining / 60, seconds_remaining % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_formats_bounds() {
        assert_eq!(format_clock(900), "15:00");
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
    }

    #[test]
    fn drive_result_points_match_spec() {
        assert_eq!(DriveResult::Touchdown.points(), 7);
        assert_eq!(DriveResult::FieldGoal.points(), 3);
        assert_eq!(DriveResult::Punt.points(), 0);
        assert_eq!(DriveResult::TurnoverOnDowns.points(), 0);
    }
}
