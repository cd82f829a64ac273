//! Per-play models: success modifier, play selection, yardage distributions,
//! turnover checks, and the field goal / kickoff / punt mechanics
//! (spec.md §4.2).

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::rng::Lcg32;
use crate::team::TeamStats;
use crate::weather::WeatherEffects;

use super::types::PlayType;

/// `(offense_rating + home_bonus - defense_rating + situation_modifier) / 90`.
pub fn success_modifier(
    offense: &TeamStats,
    defense: &TeamStats,
    is_home_offense: bool,
    down: u8,
    yards_to_go: u8,
    field_position: u8,
) -> f64 {
    let home_bonus = if is_home_offense {
        f64::from(offense.home_field_advantage)
    } else {
        0.0
    };

    let mut situation = match down {
        1 => 5.0,
        2 => 2.0,
        3 => -3.0,
        4 => -8.0,
        _ => 0.0,
    };
    if yards_to_go <= 3 {
        situation += 3.0;
    }
    if yards_to_go >= 10 {
        situation -= 5.0;
    }
    let yards_to_goal = 100_i32 - i32::from(field_position);
    if yards_to_goal <= 20 {
        situation += 3.0;
    }

    (f64::from(offense.offensive) + home_bonus - f64::from(defense.defensive) + situation) / 90.0
}

/// Chooses among `Run | Pass | Special`; favors pass on third/fourth-and-long
/// and run near the goal line, per spec.md §4.2.
pub fn select_play_type(down: u8, yards_to_go: u8, field_position: u8, rng: &mut Lcg32) -> PlayType {
    let yards_to_goal = 100_i32 - i32::from(field_position);

    let mut run_weight = 45.0_f64;
    let mut pass_weight = 45.0_f64;
    let special_weight = 10.0_f64;

    if down >= 2 && yards_to_go >= 10 {
        pass_weight += 25.0;
        run_weight -= 15.0;
    }
    if yards_to_goal <= 5 {
        run_weight += 25.0;
        pass_weight -= 15.0;
    }
    run_weight = run_weight.max(5.0);
    pass_weight = pass_weight.max(5.0);

    let total = run_weight + pass_weight + special_weight;
    let roll = rng.next_f64() * total;
    if roll < run_weight {
        PlayType::Run
    } else if roll < run_weight + pass_weight {
        PlayType::Pass
    } else {
        PlayType::Special
    }
}

/// Per-play turnover probability, clamped to `[0.005, 0.12]`.
pub fn turnover_chance(play_type: PlayType, down: u8, success: f64, fx: &WeatherEffects) -> f64 {
    let base = match play_type {
        PlayType::Pass => 0.018,
        PlayType::Run => 0.012,
        _ => 0.015,
    };
    let mut chance = base - 0.015 * success;
    if down >= 3 {
        chance *= 1.5;
    }
    chance *= match play_type {
        PlayType::Run => fx.fumble_chance,
        _ => (2.0 - fx.visibility + 2.0 - fx.field_condition) / 2.0,
    };
    chance.clamp(0.005, 0.12)
}

/// `Normal(4.2 + 2.5*success, 2.5)`, clamped to `[-3, 25]`, further capped at
/// `yards_to_goal + 2` inside the 5-yard line, scaled by `weather.rushing_yards`.
pub fn run_yards(success: f64, field_position: u8, fx: &WeatherEffects, rng: &mut Lcg32) -> i32 {
    let normal = Normal::new(4.2 + 2.5 * success, 2.5).expect("valid normal params");
    let mut yards = normal.sample(rng);
    yards = yards.clamp(-3.0, 25.0);

    let yards_to_goal = 100_i32 - i32::from(field_position);
    if yards_to_goal < 5 {
        yards = yards.min(yards_to_goal as f64 + 2.0);
    }
    yards *= fx.rushing_yards;
    yards.round() as i32
}

/// Completion probability: `clamp(0.7 + 0.2*success, 0.45, 0.9)`, scaled by
/// `passing_accuracy * visibility`, re-clamped to `[0.15, 0.9]`.
pub fn pass_completion_probability(success: f64, fx: &WeatherEffects) -> f64 {
    let base = (0.7 + 0.2 * success).clamp(0.45, 0.9);
    (base * fx.passing_accuracy * fx.visibility).clamp(0.15, 0.9)
}

/// On completion: `Normal(base + 4.0*success, 4)`, clamped to `[0, 40]`,
/// scaled by `passing_distance`. `base = 8.5`, or `0.9*yards_to_go` when
/// `yards_to_go > 10`.
pub fn pass_yards(success: f64, yards_to_go: u8, fx: &WeatherEffects, rng: &mut Lcg32) -> i32 {
    let base = if yards_to_go > 10 {
        0.9 * f64::from(yards_to_go)
    } else {
        8.5
    };
    let normal = Normal::new(base + 4.0 * success, 4.0).expect("valid normal params");
    let yards = normal.sample(rng).clamp(0.0, 40.0) * fx.passing_distance;
    yards.round() as i32
}

/// `30% + 20%*success` chance of a big play (8..24 yards), else a small
/// loss (-5..2 yards).
pub fn special_yards(success: f64, rng: &mut Lcg32) -> i32 {
    let big_play_chance = (0.30 + 0.20 * success).clamp(0.0, 1.0);
    if rng.next_f64() < big_play_chance {
        rng.gen_range(8..=24)
    } else {
        rng.gen_range(-5..=2)
    }
}

/// Field goal attempt distance in yards: `(100 - field) + 17`.
pub fn field_goal_distance(field_position: u8) -> i32 {
    (100_i32 - i32::from(field_position)) + 17
}

/// Field goal success probability per spec.md §4.2's distance bands,
/// adjusted by special-teams rating, home field, and weather; clamped to
/// `[0.15, 0.98]`.
pub fn field_goal_success_probability(
    distance: i32,
    offense: &TeamStats,
    is_home: bool,
    fx: &WeatherEffects,
) -> f64 {
    let base = if distance <= 30 {
        0.98
    } else if distance <= 40 {
        0.90
    } else if distance <= 50 {
        0.78
    } else {
        0.58
    };

    let mut probability = base + (f64::from(offense.special_teams) - 75.0) / 100.0;
    if is_home {
        probability += 0.05;
    }
    probability *= fx.kicking_accuracy;
    if distance > 40 {
        probability *= fx.kicking_distance;
    }
    probability.clamp(0.15, 0.98)
}

/// Kickoff return starting field position (receiving team's own scale),
/// clamped to `[10, 50]`.
pub fn kickoff_return_field(receiver_special_teams: u8, kicker_special_teams: u8, rng: &mut Lcg32) -> u8 {
    let normal = Normal::new(0.0, 8.0).expect("valid normal params");
    let value = 25.0
        + normal.sample(rng)
        + 5.0 * (f64::from(receiver_special_teams) - f64::from(kicker_special_teams));
    value.clamp(10.0, 50.0).round() as u8
}

/// Punts from `field_position` (punting team's own scale). Returns the
/// receiving team's new field position and whether it was a touchback.
pub fn punt_result(
    field_position: u8,
    punter_special_teams: u8,
    returner_special_teams: u8,
    rng: &mut Lcg32,
) -> (u8, bool) {
    let distance_normal = Normal::new(0.0, 8.0).expect("valid normal params");
    let distance =
        (42.0 + distance_normal.sample(rng) + 5.0 * f64::from(punter_special_teams)).clamp(25.0, 60.0);
    let landing_spot = f64::from(field_position) + distance;

    if landing_spot >= 100.0 {
        (20, true)
    } else {
        let return_normal = Normal::new(8.0, 4.0).expect("valid normal params");
        let return_yards = (return_normal.sample(rng) + 3.0 * f64::from(returner_special_teams))
            .clamp(0.0, 20.0);
        let new_field = (100.0 - landing_spot + return_yards).clamp(1.0, 99.0);
        (new_field.round() as u8, false)
    }
}

/// A fourth-down decision, made before the play is run (spec.md §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FourthDownChoice {
    GoForIt,
    FieldGoal,
    Punt,
}

pub fn fourth_down_decision(
    quarter_is_fourth: bool,
    clock_remaining: u32,
    field_position: u8,
    yards_to_go: u8,
    rng: &mut Lcg32,
) -> FourthDownChoice {
    let opponent_territory = field_position > 50;
    if yards_to_go <= 2 && (opponent_territory || quarter_is_fourth) {
        return FourthDownChoice::GoForIt;
    }

    if field_position >= 47 {
        let kick_distance = field_goal_distance(field_position);
        if kick_distance <= 45 {
            return FourthDownChoice::FieldGoal;
        }
        if quarter_is_fourth && clock_remaining < 300 {
            return FourthDownChoice::FieldGoal;
        }
        if yards_to_go <= 2 {
            return FourthDownChoice::GoForIt;
        }
        return FourthDownChoice::FieldGoal;
    }

    if quarter_is_fourth && clock_remaining < 120 && field_position >= 45 {
        return FourthDownChoice::GoForIt;
    }

    if field_position < 35 {
        return FourthDownChoice::Punt;
    }

    if yards_to_go <= 2 && rng.next_f64() < 0.2 {
        return FourthDownChoice::GoForIt;
    }
    FourthDownChoice::Punt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turnover_chance_stays_in_bounds() {
        let fx = WeatherEffects::default();
        for down in 1..=4 {
            for success in [-2.0, -0.5, 0.0, 0.5, 2.0] {
                let c = turnover_chance(PlayType::Pass, down, success, &fx);
                assert!((0.005..=0.12).contains(&c));
            }
        }
    }

    #[test]
    fn field_goal_probability_stays_in_bounds() {
        let stats = TeamStats {
            offensive: 70,
            defensive: 70,
            special_teams: 50,
            coaching: 70,
            home_field_advantage: 3,
        };
        let fx = WeatherEffects::default();
        for distance in [20, 35, 48, 60] {
            let p = field_goal_success_probability(distance, &stats, false, &fx);
            assert!((0.15..=0.98).contains(&p));
        }
    }

    #[test]
    fn field_goal_distance_formula() {
        assert_eq!(field_goal_distance(47), 70);
        assert_eq!(field_goal_distance(83), 34);
    }
}
