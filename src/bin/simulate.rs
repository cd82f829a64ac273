//! Reference CLI binary over the simulation core (spec.md §6): five
//! subcommands, JSON on stdout, driven entirely from the built-in NFL
//! roster and `AppConfig`'s default seed/season year.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use gridiron_core::config::AppConfig;
use gridiron_core::error::SimResult;
use gridiron_core::game::{simulate_game, GameOptions};
use gridiron_core::playoff::PlayoffEngine;
use gridiron_core::season::SeasonEngine;
use gridiron_core::team::nfl_teams;

#[derive(Parser)]
#[command(name = "simulate", about = "Deterministic NFL league simulation core")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Overrides the config-supplied default seed.
    #[arg(long, global = true)]
    seed: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Simulate a single exhibition game between two teams by id.
    SimulateGame {
        #[arg(long)]
        home: String,
        #[arg(long)]
        away: String,
    },
    /// Simulate every scheduled game in a regular-season week.
    SimulateWeek {
        #[arg(long)]
        week: u8,
    },
    /// Simulate the full 18-week regular season.
    SimulateSeason,
    /// Simulate the regular season and print standings.
    GetStandings {
        #[arg(long)]
        by_division: bool,
    },
    /// Simulate the regular season, derive the playoff bracket, and
    /// optionally play it out to a champion.
    GetBracket {
        #[arg(long)]
        play_through: bool,
    },
}

fn main() -> ExitCode {
    let config = AppConfig::load();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_new(&config.logging.log_level).unwrap_or_default())
        .init();
    let cli = Cli::parse();
    let seed = cli.seed.unwrap_or(config.league.default_seed);

    match run(cli.command, seed, config.league.season_year) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "command failed");
            let response = err.to_response();
            println!("{}", serde_json::to_string_pretty(&response).expect("ErrorResponse always serializes"));
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run(command: Command, seed: u32, season_year: u32) -> SimResult<()> {
    match command {
        Command::SimulateGame { home, away } => simulate_game_command(&home, &away, seed),
        Command::SimulateWeek { week } => simulate_week_command(week, seed, season_year),
        Command::SimulateSeason => simulate_season_command(seed, season_year),
        Command::GetStandings { by_division } => get_standings_command(by_division, seed, season_year),
        Command::GetBracket { play_through } => get_bracket_command(play_through, seed, season_year),
    }
}

fn find_team(team_id: &str) -> SimResult<gridiron_core::team::Team> {
    nfl_teams()
        .into_iter()
        .find(|t| t.team_id == team_id)
        .ok_or_else(|| gridiron_core::error::SimError::NotFound(format!("no team with id {team_id}")))
}

fn simulate_game_command(home: &str, away: &str, seed: u32) -> SimResult<()> {
    let home = find_team(home)?;
    let away = find_team(away)?;
    let result = simulate_game(&home, &away, GameOptions { seed: Some(seed), weather: None });
    print_json(&result);
    Ok(())
}

/// Runs every scheduled game in `season` through the Game Engine and folds
/// each result back in via `process_game_result`, per spec.md §4.4's data
/// flow: Season Engine hands `(home, away, options)` to the Game Engine for
/// each scheduled game.
fn simulate_all_games(season: &mut SeasonEngine, teams: &[gridiron_core::team::Team], seed: u32) -> SimResult<()> {
    for week in 1..=gridiron_core::schedule::TOTAL_WEEKS {
        let games = season.get_week_games(week)?;
        for (i, game) in games.iter().enumerate() {
            let home = teams.iter().find(|t| t.team_id == game.home).expect("scheduled team exists");
            let away = teams.iter().find(|t| t.team_id == game.away).expect("scheduled team exists");
            let game_seed = seed.wrapping_add(u32::from(week)).wrapping_add(i as u32 * 131);
            let result = simulate_game(home, away, GameOptions { seed: Some(game_seed), weather: None });
            season.process_game_result(&game.game_id, result.home_score, result.away_score, Some(result.overtime), Some(result.duration))?;
        }
    }
    Ok(())
}

fn simulate_week_command(week: u8, seed: u32, season_year: u32) -> SimResult<()> {
    let teams = nfl_teams();
    let mut season = SeasonEngine::new(teams.clone(), season_year, Some(seed))?;
    let games = season.get_week_games(week)?;
    for (i, game) in games.iter().enumerate() {
        let home = teams.iter().find(|t| t.team_id == game.home).expect("scheduled team exists");
        let away = teams.iter().find(|t| t.team_id == game.away).expect("scheduled team exists");
        let game_seed = seed.wrapping_add(u32::from(week)).wrapping_add(i as u32 * 131);
        let result = simulate_game(home, away, GameOptions { seed: Some(game_seed), weather: None });
        season.process_game_result(&game.game_id, result.home_score, result.away_score, Some(result.overtime), Some(result.duration))?;
    }
    print_json(&season.get_week_games(week)?);
    Ok(())
}

fn simulate_season_command(seed: u32, season_year: u32) -> SimResult<()> {
    let teams = nfl_teams();
    let mut season = SeasonEngine::new(teams.clone(), season_year, Some(seed))?;
    simulate_all_games(&mut season, &teams, seed)?;
    print_json(&season.get_standings(false));
    Ok(())
}

fn get_standings_command(by_division: bool, seed: u32, season_year: u32) -> SimResult<()> {
    let teams = nfl_teams();
    let mut season = SeasonEngine::new(teams.clone(), season_year, Some(seed))?;
    simulate_all_games(&mut season, &teams, seed)?;
    print_json(&season.get_standings(by_division));
    Ok(())
}

fn get_bracket_command(play_through: bool, seed: u32, season_year: u32) -> SimResult<()> {
    let teams = nfl_teams();
    let mut season = SeasonEngine::new(teams.clone(), season_year, Some(seed))?;
    simulate_all_games(&mut season, &teams, seed)?;

    let mut engine = PlayoffEngine::from_records(&teams, season.records(), season.year())?;

    if play_through {
        play_bracket_to_completion(&mut engine, seed);
    }

    print_json(engine.bracket());
    Ok(())
}

fn play_bracket_to_completion(engine: &mut PlayoffEngine, seed: u32) {
    use gridiron_core::playoff::PlayoffRound;

    let mut game_seed = seed;
    loop {
        let pending: Vec<String> = match engine.bracket().current_round {
            PlayoffRound::WildCard => engine.bracket().wild_card_games.iter().filter(|g| !g.completed).map(|g| g.game_id.clone()).collect(),
            PlayoffRound::Divisional => engine.bracket().divisional_games.iter().filter(|g| !g.completed).map(|g| g.game_id.clone()).collect(),
            PlayoffRound::ConferenceChampionship => {
                engine.bracket().conference_championship_games.iter().filter(|g| !g.completed).map(|g| g.game_id.clone()).collect()
            }
            PlayoffRound::SuperBowl => engine.bracket().super_bowl.iter().filter(|g| !g.completed).map(|g| g.game_id.clone()).collect(),
            PlayoffRound::Complete => break,
        };
        if pending.is_empty() {
            break;
        }

        for game_id in pending {
            let (home, away) = bracket_matchup(engine, &game_id);
            game_seed = game_seed.wrapping_add(1);
            let result = simulate_game(&home, &away, GameOptions { seed: Some(game_seed), weather: None });
            let winner_id = if result.home_score >= result.away_score { home.team_id.clone() } else { away.team_id.clone() };
            engine.advance_bracket(&game_id, &winner_id, result.home_score, result.away_score, Some(result.overtime));
        }
    }
}

fn bracket_matchup(engine: &PlayoffEngine, game_id: &str) -> (gridiron_core::team::Team, gridiron_core::team::Team) {
    let bracket = engine.bracket();
    let all_games = bracket
        .wild_card_games
        .iter()
        .chain(bracket.divisional_games.iter())
        .chain(bracket.conference_championship_games.iter())
        .chain(bracket.super_bowl.iter());
    let game = all_games.into_iter().find(|g| g.game_id == game_id).expect("game_id came from this bracket");
    let home = game.home.clone().expect("playoff game always has both sides assigned at materialization");
    let away = game.away.clone().expect("playoff game always has both sides assigned at materialization");
    (home, away)
}

fn print_json<T: serde::Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).expect("value always serializes to JSON"));
}
