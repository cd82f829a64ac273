//! Schedule Generator (spec.md §4.3): NFL-mode intradivision/cross-division/
//! interconference schedule with bye weeks, plus a generic round-robin
//! fallback for non-32-team inputs.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{SimError, SimResult};
use crate::rng::Lcg32;
use crate::team::{Conference, Division, Team};

pub const TOTAL_WEEKS: u8 = 18;
pub const GAMES_PER_TEAM_NFL: u8 = 17;
const FILLER_ATTEMPT_CAP: u32 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matchup {
    pub home: usize,
    pub away: usize,
}

/// `week → [{home, away}]`, 1-indexed weeks in `1..=TOTAL_WEEKS`.
pub type Schedule = Vec<Vec<Matchup>>;

/// Generates a full-season schedule against `teams`, indexed positionally
/// (a `Matchup`'s `home`/`away` are indices into `teams`).
pub fn generate_schedule(teams: &[Team], seed: Option<u32>) -> SimResult<Schedule> {
    if teams.len() < 2 || teams.len() % 2 != 0 {
        return Err(SimError::InvalidArgument(
            "schedule generation requires an even number of teams".to_string(),
        ));
    }

    let mut rng = match seed {
        Some(s) => Lcg32::new(s),
        None => Lcg32::from_entropy(),
    };

    let pairings = if is_nfl_shape(teams) {
        nfl_pairings(teams, &mut rng)
    } else {
        fallback_pairings(teams, &mut rng)
    };

    let byes = if is_nfl_shape(teams) { assign_byes(teams.len(), &mut rng) } else { vec![None; teams.len()] };

    Ok(pack_weeks(pairings, &byes, &mut rng))
}

fn is_nfl_shape(teams: &[Team]) -> bool {
    if teams.len() != 32 {
        return false;
    }
    for conference in [Conference::Afc, Conference::Nfc] {
        for division in [Division::North, Division::South, Division::East, Division::West] {
            let count = teams.iter().filter(|t| t.conference == conference && t.division == division).count();
            if count != 4 {
                return false;
            }
        }
    }
    true
}

/// Builds the full 17-game-per-team NFL pairing list (spec.md §4.3, steps 1-4).
fn nfl_pairings(teams: &[Team], rng: &mut Lcg32) -> Vec<Matchup> {
    let mut pairings = Vec::new();
    let mut games_played = vec![0u8; teams.len()];

    let division_groups = division_groups(teams);

    // 1. Intradivision double round-robin: 4 teams -> 6 unique pairs, each
    // played home-and-away (6 games per team).
    for group in &division_groups {
        for i in 0..group.len() {
            for j in (i + 1)..group.len() {
                let (a, b) = (group[i], group[j]);
                pairings.push(Matchup { home: a, away: b });
                pairings.push(Matchup { home: b, away: a });
                games_played[a] += 2;
                games_played[b] += 2;
            }
        }
    }

    // 2. Intraconference cross-division: pair each conference's 4 divisions
    // into two division-pairs; every team in one division plays every team
    // in the paired division once, home/away randomized per pair.
    for conference in [Conference::Afc, Conference::Nfc] {
        let divisions = [Division::North, Division::South, Division::East, Division::West];
        let conf_groups: Vec<Vec<usize>> = divisions
            .iter()
            .map(|d| division_group(teams, conference, *d))
            .collect();
        let (pair_a, pair_b) = (vec![0, 1], vec![2, 3]);
        for (x, y) in [(pair_a[0], pair_a[1]), (pair_b[0], pair_b[1])] {
            for &a in &conf_groups[x] {
                for &b in &conf_groups[y] {
                    let (home, away) = if rng.next_f64() < 0.5 { (a, b) } else { (b, a) };
                    pairings.push(Matchup { home, away });
                    games_played[a] += 1;
                    games_played[b] += 1;
                }
            }
        }
    }

    // 3. Interconference: AFC divisions rotate against NFC divisions, 16
    // games (4 divisions x 4 teams) per division pairing, two pairings.
    let afc_divisions = [Division::North, Division::South, Division::East, Division::West];
    let nfc_rotation = [Division::South, Division::North, Division::West, Division::East];
    for (i, afc_div) in afc_divisions.iter().enumerate() {
        let nfc_div = nfc_rotation[i];
        let afc_group = division_group(teams, Conference::Afc, *afc_div);
        let nfc_group = division_group(teams, Conference::Nfc, nfc_div);
        for &a in &afc_group {
            for &n in &nfc_group {
                let (home, away) = if rng.next_f64() < 0.5 { (a, n) } else { (n, a) };
                pairings.push(Matchup { home, away });
                games_played[a] += 1;
                games_played[n] += 1;
            }
        }
    }

    // 4. Fillers: random intra-conference opponents up to 17 games/team,
    // bounded by a hard attempt cap (spec.md §9's open question: accept the
    // schedule as-is if the cap is exhausted).
    let mut attempts = 0;
    let mut played_pairs: std::collections::HashSet<(usize, usize)> = pairings
        .iter()
        .map(|m| (m.home.min(m.away), m.home.max(m.away)))
        .collect();

    while attempts < FILLER_ATTEMPT_CAP {
        attempts += 1;
        let needing: Vec<usize> = (0..teams.len())
            .filter(|&i| games_played[i] < GAMES_PER_TEAM_NFL)
            .collect();
        if needing.is_empty() {
            break;
        }
        let a = needing[rng.gen_range(0..needing.len())];
        let candidates: Vec<usize> = needing
            .iter()
            .copied()
            .filter(|&b| {
                b != a
                    && teams[b].conference == teams[a].conference
                    && !played_pairs.contains(&(a.min(b), a.max(b)))
            })
            .collect();
        if candidates.is_empty() {
            continue;
        }
        let b = candidates[rng.gen_range(0..candidates.len())];
        let (home, away) = if rng.next_f64() < 0.5 { (a, b) } else { (b, a) };
        pairings.push(Matchup { home, away });
        games_played[a] += 1;
        games_played[b] += 1;
        played_pairs.insert((a.min(b), a.max(b)));
    }

    if attempts >= FILLER_ATTEMPT_CAP {
        tracing::warn!("schedule filler loop exhausted its attempt cap; some teams may be short of 17 games");
    }

    pairings
}

fn division_groups(teams: &[Team]) -> Vec<Vec<usize>> {
    let mut groups = Vec::new();
    for conference in [Conference::Afc, Conference::Nfc] {
        for division in [Division::North, Division::South, Division::East, Division::West] {
            groups.push(division_group(teams, conference, division));
        }
    }
    groups
}

fn division_group(teams: &[Team], conference: Conference, division: Division) -> Vec<usize> {
    teams
        .iter()
        .enumerate()
        .filter(|(_, t)| t.conference == conference && t.division == division)
        .map(|(i, _)| i)
        .collect()
}

/// Double round-robin via the circle method, for any even team count not
/// matching the NFL shape.
fn fallback_pairings(teams: &[Team], rng: &mut Lcg32) -> Vec<Matchup> {
    let n = teams.len();
    let mut pairings = Vec::new();
    let mut rotation: Vec<usize> = (0..n).collect();

    for _leg in 0..2 {
        let mut working = rotation.clone();
        for _round in 0..(n - 1) {
            for i in 0..(n / 2) {
                let a = working[i];
                let b = working[n - 1 - i];
                let (home, away) = if rng.next_f64() < 0.5 { (a, b) } else { (b, a) };
                pairings.push(Matchup { home, away });
            }
            let last = working.pop().expect("working always holds n >= 2 teams");
            working.insert(1, last);
        }
        rotation.reverse();
    }

    pairings
}

/// Assigns exactly one bye week (in `5..=14`) per team via a shuffled cyclic
/// slot pattern.
fn assign_byes(team_count: usize, rng: &mut Lcg32) -> Vec<Option<u8>> {
    let bye_weeks: Vec<u8> = (5..=14).collect();
    let mut slots: Vec<u8> = Vec::with_capacity(team_count);
    while slots.len() < team_count {
        let mut cycle = bye_weeks.clone();
        cycle.shuffle(rng);
        slots.extend(cycle);
    }
    slots.truncate(team_count);
    slots.shuffle(rng);
    slots.into_iter().map(Some).collect()
}

/// Greedily packs matchups into weeks 1..=TOTAL_WEEKS such that no team
/// appears twice in a week and no team plays in its own bye week; each week
/// is shuffled afterwards for variety.
fn pack_weeks(mut pairings: Vec<Matchup>, byes: &[Option<u8>], rng: &mut Lcg32) -> Schedule {
    pairings.shuffle(rng);
    let mut weeks: Schedule = vec![Vec::new(); TOTAL_WEEKS as usize];
    let mut played_this_week: Vec<std::collections::HashSet<usize>> =
        vec![std::collections::HashSet::new(); TOTAL_WEEKS as usize];

    let mut leftovers = Vec::new();
    for m in pairings {
        let mut placed = false;
        for week_index in 0..TOTAL_WEEKS as usize {
            let week = (week_index + 1) as u8;
            if byes[m.home] == Some(week) || byes[m.away] == Some(week) {
                continue;
            }
            if played_this_week[week_index].contains(&m.home) || played_this_week[week_index].contains(&m.away) {
                continue;
            }
            weeks[week_index].push(m);
            played_this_week[week_index].insert(m.home);
            played_this_week[week_index].insert(m.away);
            placed = true;
            break;
        }
        if !placed {
            leftovers.push(m);
        }
    }

    // Relax the bye-week constraint (never the once-per-week constraint) for
    // anything that still couldn't be placed, per spec.md §4.3's fallback.
    for m in leftovers {
        for week_index in 0..TOTAL_WEEKS as usize {
            if played_this_week[week_index].contains(&m.home) || played_this_week[week_index].contains(&m.away) {
                continue;
            }
            weeks[week_index].push(m);
            played_this_week[week_index].insert(m.home);
            played_this_week[week_index].insert(m.away);
            break;
        }
    }

    for week in &mut weeks {
        week.shuffle(rng);
    }
    weeks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::nfl_teams;

    #[test]
    fn nfl_schedule_has_correct_shape() {
        let teams = nfl_teams();
        let schedule = generate_schedule(&teams, Some(7)).unwrap();
        assert_eq!(schedule.len(), TOTAL_WEEKS as usize);

        let mut games_played = vec![0u32; teams.len()];
        let mut byes_seen: Vec<Vec<u8>> = vec![Vec::new(); teams.len()];
        for (week_index, week) in schedule.iter().enumerate() {
            let week_num = (week_index + 1) as u8;
            let mut seen_this_week = std::collections::HashSet::new();
            for m in week {
                assert!(seen_this_week.insert(m.home));
                assert!(seen_this_week.insert(m.away));
                games_played[m.home] += 1;
                games_played[m.away] += 1;
            }
            for team_index in 0..teams.len() {
                if !seen_this_week.contains(&team_index) {
                    byes_seen[team_index].push(week_num);
                }
            }
        }

        for count in games_played {
            assert_eq!(count, u32::from(GAMES_PER_TEAM_NFL));
        }

        for (team_index, byes) in byes_seen.iter().enumerate() {
            assert_eq!(byes.len(), 1, "team {team_index} should have exactly one bye, saw {byes:?}");
            assert!((5..=14).contains(&byes[0]), "team {team_index}'s bye week {} outside weeks 5..14", byes[0]);
        }
    }

    #[test]
    fn fallback_handles_non_nfl_team_counts() {
        let mut teams = nfl_teams();
        teams.truncate(8);
        let schedule = generate_schedule(&teams, Some(3)).unwrap();
        assert_eq!(schedule.len(), TOTAL_WEEKS as usize);
        for week in &schedule {
            let mut seen = std::collections::HashSet::new();
            for m in week {
                assert!(seen.insert(m.home));
                assert!(seen.insert(m.away));
            }
        }
    }

    #[test]
    fn odd_team_count_is_rejected() {
        let mut teams = nfl_teams();
        teams.truncate(7);
        assert!(generate_schedule(&teams, Some(1)).is_err());
    }
}
