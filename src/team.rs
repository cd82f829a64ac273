//! Team identity and ratings (spec.md §3), plus the 32-team NFL roster as
//! static reference data and the `TeamRepository` read boundary (§6).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conference {
    Afc,
    Nfc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Division {
    North,
    South,
    East,
    West,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStats {
    pub offensive: u8,
    pub defensive: u8,
    pub special_teams: u8,
    pub coaching: u8,
    pub home_field_advantage: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub team_id: String,
    pub abbreviation: String,
    pub city: String,
    pub name: String,
    pub conference: Conference,
    pub division: Division,
    pub stats: TeamStats,
}

/// Read-only lookup used by schedule generation and the Game Engine's
/// rating inputs.
pub trait TeamRepository {
    fn list(&self) -> Vec<Team>;
    fn get(&self, team_id: &str) -> Option<Team>;
}

pub struct InMemoryTeamRepository {
    teams: Vec<Team>,
}

impl InMemoryTeamRepository {
    pub fn new(teams: Vec<Team>) -> Self {
        Self { teams }
    }

    pub fn nfl() -> Self {
        Self::new(nfl_teams())
    }
}

impl TeamRepository for InMemoryTeamRepository {
    fn list(&self) -> Vec<Team> {
        self.teams.clone()
    }

    fn get(&self, team_id: &str) -> Option<Team> {
        self.teams.iter().find(|t| t.team_id == team_id).cloned()
    }
}

macro_rules! team {
    ($id:expr, $abbr:expr, $city:expr, $name:expr, $conf:expr, $div:expr, $off:expr, $def:expr, $st:expr, $coach:expr, $hfa:expr) => {
        Team {
            team_id: $id.to_string(),
            abbreviation: $abbr.to_string(),
            city: $city.to_string(),
            name: $name.to_string(),
            conference: $conf,
            division: $div,
            stats: TeamStats {
                offensive: $off,
                defensive: $def,
                special_teams: $st,
                coaching: $coach,
                home_field_advantage: $hfa,
            },
        }
    };
}

/// The 32-team NFL roster, organized 2 conferences x 4 divisions x 4 teams,
/// as spec.md §3 requires for NFL-mode scheduling.
pub fn nfl_teams() -> Vec<Team> {
    use Conference::{Afc, Nfc};
    use Division::{East, North, South, West};

    vec![
        // AFC East
        team!("buf", "BUF", "Buffalo", "Bills", Afc, East, 86, 84, 78, 85, 3),
        team!("mia", "MIA", "Miami", "Dolphins", Afc, East, 80, 74, 72, 70, 2),
        team!("ne", "NE", "New England", "Patriots", Afc, East, 68, 72, 70, 82, 3),
        team!("nyj", "NYJ", "New York", "Jets", Afc, East, 70, 78, 74, 68, 2),
        // AFC North
        team!("bal", "BAL", "Baltimore", "Ravens", Afc, North, 87, 82, 80, 86, 4),
        team!("cin", "CIN", "Cincinnati", "Bengals", Afc, North, 85, 75, 71, 74, 2),
        team!("cle", "CLE", "Cleveland", "Browns", Afc, North, 72, 83, 75, 71, 4),
        team!("pit", "PIT", "Pittsburgh", "Steelers", Afc, North, 74, 80, 77, 83, 4),
        // AFC South
        team!("hou", "HOU", "Houston", "Texans", Afc, South, 82, 76, 73, 78, 3),
        team!("ind", "IND", "Indianapolis", "Colts", Afc, South, 76, 73, 72, 70, 2),
        team!("jax", "JAX", "Jacksonville", "Jaguars", Afc, South, 74, 71, 69, 69, 1),
        team!("ten", "TEN", "Tennessee", "Titans", Afc, South, 69, 72, 68, 67, 2),
        // AFC West
        team!("den", "DEN", "Denver", "Broncos", Afc, West, 75, 81, 76, 79, 4),
        team!("kc", "KC", "Kansas City", "Chiefs", Afc, West, 91, 79, 82, 92, 5),
        team!("lv", "LV", "Las Vegas", "Raiders", Afc, West, 71, 70, 70, 66, 2),
        team!("lac", "LAC", "Los Angeles", "Chargers", Afc, West, 78, 77, 74, 75, 2),
        // NFC East
        team!("dal", "DAL", "Dallas", "Cowboys", Nfc, East, 81, 78, 75, 76, 4),
        team!("nyg", "NYG", "New York", "Giants", Nfc, East, 67, 74, 70, 65, 2),
        team!("phi", "PHI", "Philadelphia", "Eagles", Nfc, East, 88, 80, 78, 84, 4),
        team!("wsh", "WSH", "Washington", "Commanders", Nfc, East, 79, 73, 72, 77, 3),
        // NFC North
        team!("chi", "CHI", "Chicago", "Bears", Nfc, North, 73, 79, 74, 71, 3),
        team!("det", "DET", "Detroit", "Lions", Nfc, North, 89, 77, 76, 87, 4),
        team!("gb", "GB", "Green Bay", "Packers", Nfc, North, 82, 78, 75, 80, 5),
        team!("min", "MIN", "Minnesota", "Vikings", Nfc, North, 80, 76, 74, 78, 3),
        // NFC South
        team!("atl", "ATL", "Atlanta", "Falcons", Nfc, South, 77, 70, 69, 68, 2),
        team!("car", "CAR", "Carolina", "Panthers", Nfc, South, 65, 69, 68, 64, 1),
        team!("no", "NO", "New Orleans", "Saints", Nfc, South, 75, 74, 73, 79, 4),
        team!("tb", "TB", "Tampa Bay", "Buccaneers", Nfc, South, 78, 75, 72, 76, 2),
        // NFC West
        team!("ari", "ARI", "Arizona", "Cardinals", Nfc, West, 72, 69, 70, 67, 2),
        team!("lar", "LAR", "Los Angeles", "Rams", Nfc, West, 83, 79, 77, 85, 3),
        team!("sf", "SF", "San Francisco", "49ers", Nfc, West, 86, 85, 79, 88, 4),
        team!("sea", "SEA", "Seattle", "Seahawks", Nfc, West, 77, 78, 76, 73, 5),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn nfl_roster_has_32_teams_in_4x4_structure() {
        let teams = nfl_teams();
        assert_eq!(teams.len(), 32);

        for conference in [Conference::Afc, Conference::Nfc] {
            for division in [Division::North, Division::South, Division::East, Division::West] {
                let count = teams
                    .iter()
                    .filter(|t| t.conference == conference && t.division == division)
                    .count();
                assert_eq!(count, 4);
            }
        }
    }

    #[test]
    fn abbreviations_are_unique() {
        let teams = nfl_teams();
        let unique: HashSet<_> = teams.iter().map(|t| t.abbreviation.clone()).collect();
        assert_eq!(unique.len(), teams.len());
    }
}
