use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// League configuration
    #[serde(default)]
    pub league: LeagueConfig,

    /// Reference-binary logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct LeagueConfig {
    /// Default PRNG seed used when a subcommand omits `--seed` (default: 42)
    #[serde(default = "default_seed")]
    pub default_seed: u32,

    /// Season year stamped on generated schedules and brackets (default: 2024)
    #[serde(default = "default_season_year")]
    pub season_year: u32,

    /// Path to the JSON file listing teams to seed the in-memory
    /// TeamRepository from (default: "teams.json")
    #[serde(default = "default_teams_path")]
    pub teams_path: String,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_seed() -> u32 {
    42
}

fn default_season_year() -> u32 {
    2024
}

fn default_teams_path() -> String {
    "teams.json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            default_seed: default_seed(),
            season_year: default_season_year(),
            teams_path: default_teams_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Self {
        Config::builder()
            // 1. Base config file (committed - non-secret defaults)
            .add_source(File::with_name("config/default").required(false))
            // 2. Local config file (gitignored - local overrides)
            .add_source(File::with_name("config/local").required(false))
            // 3. Environment variables (highest priority)
            //    APP_LEAGUE__DEFAULT_SEED → league.default_seed
            //    APP_LOGGING__LOG_LEVEL → logging.log_level
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .expect("Failed to build configuration")
            .try_deserialize()
            .unwrap_or_else(|_| AppConfig {
                league: LeagueConfig::default(),
                logging: LoggingConfig::default(),
            })
    }
}
