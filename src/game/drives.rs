//! The drive loop: runs plays against a single possession until it ends,
//! tracking down/distance/field position and per-team stats (spec.md §4.2).

use rand::Rng;

use crate::rng::Lcg32;
use crate::team::Team;
use crate::weather::WeatherEffects;

use super::plays::{
    FourthDownChoice, field_goal_distance, field_goal_success_probability, fourth_down_decision,
    pass_completion_probability, pass_yards, punt_result, run_yards, select_play_type,
    special_yards, success_modifier, turnover_chance,
};
use super::types::{DriveLog, DriveResult, PlayLogEntry, PlayType, Possession, Quarter, format_clock};

/// Maximum plays run within a single drive before it is forced to end as a
/// punt (spec.md §4.2's "20-play hard safety cap").
const MAX_PLAYS_PER_DRIVE: u32 = 20;

pub struct GameClock {
    pub quarter: Quarter,
    pub clock: u32,
    pub possession: Possession,
    pub down: u8,
    pub distance: u8,
    pub field_position: u8,
    pub first_down_marker: u8,
    pub drive_number: u32,
}

impl GameClock {
    pub fn start_drive(&mut self, field_position: u8) {
        self.down = 1;
        self.distance = 10;
        self.field_position = field_position;
        self.first_down_marker = first_down_marker(field_position, 10);
    }
}

fn first_down_marker(field_position: u8, distance: u8) -> u8 {
    (field_position + distance).min(100)
}

fn play_time(play_type: PlayType, rng: &mut Lcg32) -> u32 {
    match play_type {
        PlayType::Run => rng.gen_range(2..=6),
        PlayType::Pass => rng.gen_range(1..=7),
        PlayType::Turnover => rng.gen_range(3..=6),
        PlayType::Special => rng.gen_range(3..=5),
    }
}

fn between_play_time(down: u8, rng: &mut Lcg32) -> u32 {
    if down >= 3 {
        rng.gen_range(10..=20)
    } else {
        rng.gen_range(15..=25)
    }
}

/// Returns `(total_clock_cost, play_time_component)` — the latter is what
/// accumulates into `TeamSimulationStats::time_of_possession` (spec.md
/// §4.2: "TOP (sum of play times)", excluding between-play/stoppage time).
fn clock_cost(play_type: PlayType, down: u8, rng: &mut Lcg32) -> (u32, u32) {
    let snap = play_time(play_type, rng);
    let mut cost = snap + between_play_time(down, rng);
    if rng.next_f64() < 0.03 {
        cost += rng.gen_range(15..=45);
    }
    (cost, snap)
}

struct Snapshot<'a> {
    offense: &'a Team,
    defense: &'a Team,
    is_home_offense: bool,
}

/// Runs one drive to completion, mutating `clock`/scores/stats in place and
/// returning the outcome that governs the next possession.
#[allow(clippy::too_many_arguments)]
pub fn run_drive(
    clock: &mut GameClock,
    home: &Team,
    away: &Team,
    home_score: &mut u32,
    away_score: &mut u32,
    play_by_play: &mut Vec<PlayLogEntry>,
    home_stats: &mut super::types::TeamSimulationStats,
    away_stats: &mut super::types::TeamSimulationStats,
    weather_fx: &WeatherEffects,
    rng: &mut Lcg32,
) -> DriveLog {
    let snapshot = if clock.possession == Possession::Home {
        Snapshot { offense: home, defense: away, is_home_offense: true }
    } else {
        Snapshot { offense: away, defense: home, is_home_offense: false }
    };

    let start_field = clock.field_position;
    let offense_abbr = snapshot.offense.abbreviation.clone();
    let defense_abbr = snapshot.defense.abbreviation.clone();
    let mut play_log: Vec<PlayLogEntry> = Vec::new();
    let mut time_elapsed: u32 = 0;
    let mut result = DriveResult::EndOfQuarter;
    let mut final_description: Option<String> = None;
    let mut terminated = false;

    for _play_index in 0..MAX_PLAYS_PER_DRIVE {
        if clock.clock == 0 {
            result = DriveResult::EndOfQuarter;
            terminated = true;
            break;
        }

        let quarter_is_fourth = matches!(clock.quarter, Quarter::Fourth);
        let outcome = if clock.down == 4 {
            run_fourth_down_play(clock, &snapshot, quarter_is_fourth, weather_fx, rng)
        } else {
            run_ordinary_play(clock, &snapshot, weather_fx, rng)
        };

        time_elapsed += outcome.clock_cost;
        clock.clock = clock.clock.saturating_sub(outcome.clock_cost);

        let stats = if snapshot.is_home_offense { &mut *home_stats } else { &mut *away_stats };
        accumulate_stats(stats, &outcome);

        play_log.push(outcome.entry.clone());
        play_by_play.push(outcome.entry.clone());

        match outcome.end {
            Some(PlayEnd::Touchdown) => {
                let points = 7;
                if snapshot.is_home_offense {
                    *home_score += points;
                } else {
                    *away_score += points;
                }
                result = DriveResult::Touchdown;
                final_description =
                    Some(format!("{} touchdown", snapshot.offense.abbreviation));
                terminated = true;
                break;
            }
            Some(PlayEnd::FieldGoalGood) => {
                let points = 3;
                if snapshot.is_home_offense {
                    *home_score += points;
                } else {
                    *away_score += points;
                }
                result = DriveResult::FieldGoal;
                final_description =
                    Some(format!("{} field goal is good", snapshot.offense.abbreviation));
                terminated = true;
                break;
            }
            Some(PlayEnd::FieldGoalMissed { new_field }) => {
                clock.field_position = new_field;
                clock.down = 1;
                clock.distance = 10;
                result = DriveResult::MissedFg;
                final_description = Some("field goal attempt missed".to_string());
                terminated = true;
                break;
            }
            Some(PlayEnd::Punt { new_field }) => {
                clock.field_position = new_field;
                result = DriveResult::Punt;
                final_description = Some(format!("{} punts", snapshot.offense.abbreviation));
                terminated = true;
                break;
            }
            Some(PlayEnd::Turnover { new_field }) => {
                clock.field_position = new_field;
                result = DriveResult::Turnover;
                final_description = Some("turnover".to_string());
                terminated = true;
                break;
            }
            Some(PlayEnd::TurnoverOnDowns { new_field }) => {
                clock.field_position = new_field;
                result = DriveResult::TurnoverOnDowns;
                final_description = Some("turnover on downs".to_string());
                terminated = true;
                break;
            }
            None => {
                // Drive continues; down/distance/field already advanced.
            }
        }

        if clock.clock == 0 && final_description.is_none() {
            result = DriveResult::EndOfQuarter;
            terminated = true;
            break;
        }
    }

    if !terminated {
        let (new_field, _) = punt_result(
            clock.field_position,
            snapshot.offense.stats.special_teams,
            snapshot.defense.stats.special_teams,
            rng,
        );
        clock.field_position = new_field;
        result = DriveResult::Punt;
        final_description = Some("drive exhausted its play cap; forced punt".to_string());
    }

    DriveLog {
        quarter: clock.quarter,
        drive_number: clock.drive_number,
        offense_abbr,
        defense_abbr,
        start_field,
        result,
        points: result.points(),
        time_elapsed,
        plays: play_log.len() as u32,
        play_log,
        final_play_description: final_description,
    }
}

enum PlayEnd {
    Touchdown,
    FieldGoalGood,
    FieldGoalMissed { new_field: u8 },
    Punt { new_field: u8 },
    Turnover { new_field: u8 },
    TurnoverOnDowns { new_field: u8 },
}

struct PlayOutcome {
    entry: PlayLogEntry,
    clock_cost: u32,
    play_time: u32,
    end: Option<PlayEnd>,
    converted_down: bool,
}

fn run_fourth_down_play(
    clock: &mut GameClock,
    snapshot: &Snapshot,
    quarter_is_fourth: bool,
    fx: &WeatherEffects,
    rng: &mut Lcg32,
) -> PlayOutcome {
    let choice = fourth_down_decision(
        quarter_is_fourth,
        clock.clock,
        clock.field_position,
        clock.distance,
        rng,
    );

    match choice {
        FourthDownChoice::FieldGoal => {
            let distance = field_goal_distance(clock.field_position);
            let probability = field_goal_success_probability(
                distance,
                &snapshot.offense.stats,
                snapshot.is_home_offense,
                fx,
            );
            let good = rng.next_f64() < probability;
            let start_field = clock.field_position;
            let (clock_cost, play_time) = clock_cost(PlayType::Special, clock.down, rng);
            let end_field = start_field;
            let entry = PlayLogEntry {
                quarter: clock.quarter,
                down: clock.down,
                yards_to_go: clock.distance,
                start_field,
                end_field,
                play_type: PlayType::Special,
                yards_gained: 0,
                clock: format_clock(clock.clock.saturating_sub(clock_cost)),
            };
            let end = if good {
                PlayEnd::FieldGoalGood
            } else {
                PlayEnd::FieldGoalMissed { new_field: 100 - start_field }
            };
            PlayOutcome { entry, clock_cost, play_time, end: Some(end), converted_down: false }
        }
        FourthDownChoice::Punt => {
            let start_field = clock.field_position;
            let (new_field, _touchback) = punt_result(
                start_field,
                snapshot.offense.stats.special_teams,
                snapshot.defense.stats.special_teams,
                rng,
            );
            let (clock_cost, play_time) = clock_cost(PlayType::Special, clock.down, rng);
            let entry = PlayLogEntry {
                quarter: clock.quarter,
                down: clock.down,
                yards_to_go: clock.distance,
                start_field,
                end_field: start_field,
                play_type: PlayType::Special,
                yards_gained: 0,
                clock: format_clock(clock.clock.saturating_sub(clock_cost)),
            };
            PlayOutcome {
                entry,
                clock_cost,
                play_time,
                end: Some(PlayEnd::Punt { new_field }),
                converted_down: false,
            }
        }
        FourthDownChoice::GoForIt => run_ordinary_play(clock, snapshot, fx, rng),
    }
}

fn run_ordinary_play(
    clock: &mut GameClock,
    snapshot: &Snapshot,
    fx: &WeatherEffects,
    rng: &mut Lcg32,
) -> PlayOutcome {
    let down = clock.down;
    let distance = clock.distance;
    let start_field = clock.field_position;

    let success = success_modifier(
        &snapshot.offense.stats,
        &snapshot.defense.stats,
        snapshot.is_home_offense,
        down,
        distance,
        start_field,
    );
    let chosen_type = select_play_type(down, distance, start_field, rng);

    let turnover_probability = turnover_chance(chosen_type, down, success, fx);
    let is_turnover = rng.next_f64() < turnover_probability;

    if is_turnover {
        let (clock_cost, play_time) = clock_cost(PlayType::Turnover, down, rng);
        let entry = PlayLogEntry {
            quarter: clock.quarter,
            down,
            yards_to_go: distance,
            start_field,
            end_field: start_field,
            play_type: PlayType::Turnover,
            yards_gained: 0,
            clock: format_clock(clock.clock.saturating_sub(clock_cost)),
        };
        return PlayOutcome {
            entry,
            clock_cost,
            play_time,
            end: Some(PlayEnd::Turnover { new_field: 100 - start_field }),
            converted_down: false,
        };
    }

    let yards_gained = match chosen_type {
        PlayType::Run => run_yards(success, start_field, fx, rng),
        PlayType::Pass => {
            let completion_probability = pass_completion_probability(success, fx);
            if rng.next_f64() < completion_probability {
                pass_yards(success, distance, fx, rng)
            } else {
                0
            }
        }
        PlayType::Special => special_yards(success, rng),
        PlayType::Turnover => unreachable!("turnover handled above"),
    };

    let raw_end_field = i32::from(start_field) + yards_gained;
    let end_field = raw_end_field.clamp(0, 100) as u8;
    let (clock_cost, play_time) = clock_cost(chosen_type, down, rng);

    let entry = PlayLogEntry {
        quarter: clock.quarter,
        down,
        yards_to_go: distance,
        start_field,
        end_field,
        play_type: chosen_type,
        yards_gained,
        clock: format_clock(clock.clock.saturating_sub(clock_cost)),
    };

    if end_field >= 100 {
        return PlayOutcome {
            entry,
            clock_cost,
            play_time,
            end: Some(PlayEnd::Touchdown),
            converted_down: true,
        };
    }

    let converted = end_field >= clock.first_down_marker;
    if converted {
        clock.down = 1;
        clock.distance = (100 - end_field).min(10);
        clock.first_down_marker = first_down_marker(end_field, clock.distance);
        clock.field_position = end_field;
        PlayOutcome { entry, clock_cost, play_time, end: None, converted_down: true }
    } else {
        clock.down += 1;
        clock.distance = clock.first_down_marker.saturating_sub(end_field).max(1);
        clock.field_position = end_field;
        if clock.down > 4 {
            PlayOutcome {
                entry,
                clock_cost,
                play_time,
                end: Some(PlayEnd::TurnoverOnDowns { new_field: (100 - end_field).min(99) }),
                converted_down: false,
            }
        } else {
            PlayOutcome { entry, clock_cost, play_time, end: None, converted_down: false }
        }
    }
}

fn accumulate_stats(stats: &mut super::types::TeamSimulationStats, outcome: &PlayOutcome) {
    let entry = &outcome.entry;
    let positive_yards = entry.yards_gained.max(0);
    stats.total_yards += positive_yards;
    match entry.play_type {
        PlayType::Pass => stats.passing_yards += positive_yards,
        PlayType::Run => stats.rushing_yards += positive_yards,
        _ => {}
    }
    stats.plays += 1;
    stats.time_of_possession += outcome.play_time;
    if matches!(entry.play_type, PlayType::Turnover) {
        stats.turnovers += 1;
    }

    let scored_touchdown = matches!(outcome.end, Some(PlayEnd::Touchdown));
    if entry.down == 3 {
        stats.third_down.attempts += 1;
        if outcome.converted_down || scored_touchdown {
            stats.third_down.conversions += 1;
        }
    } else if entry.down == 4 {
        stats.fourth_down.attempts += 1;
        if outcome.converted_down || scored_touchdown {
            stats.fourth_down.conversions += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::{Conference, Division, TeamStats};

    fn sample_team(id: &str, off: u8, def: u8) -> Team {
        Team {
            team_id: id.to_string(),
            abbreviation: id.to_uppercase(),
            city: "City".to_string(),
            name: "Team".to_string(),
            conference: Conference::Afc,
            division: Division::East,
            stats: TeamStats {
                offensive: off,
                defensive: def,
                special_teams: 75,
                coaching: 75,
                home_field_advantage: 3,
            },
        }
    }

    #[test]
    fn drive_terminates_within_play_cap() {
        let home = sample_team("kc", 80, 80);
        let away = sample_team("buf", 80, 80);
        let mut rng = Lcg32::new(42);
        let fx = WeatherEffects::default();
        let mut clock = GameClock {
            quarter: Quarter::First,
            clock: 900,
            possession: Possession::Home,
            down: 1,
            distance: 10,
            field_position: 25,
            first_down_marker: 35,
            drive_number: 1,
        };
        let mut home_score = 0;
        let mut away_score = 0;
        let mut pbp = Vec::new();
        let mut home_stats = Default::default();
        let mut away_stats = Default::default();

        let log = run_drive(
            &mut clock,
            &home,
            &away,
            &mut home_score,
            &mut away_score,
            &mut pbp,
            &mut home_stats,
            &mut away_stats,
            &fx,
            &mut rng,
        );

        assert!(log.plays <= MAX_PLAYS_PER_DRIVE);
        assert!(log.plays as usize == log.play_log.len());
    }
}
