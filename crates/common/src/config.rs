//! Application configuration.

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::Path;

use crate::{AppError, AppResult};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Voting window configuration.
    #[serde(default)]
    pub voting: VotingConfig,
    /// Root administrator created on first start.
    #[serde(default)]
    pub root: RootUserConfig,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (`postgres://...` or `sqlite:...`).
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Voting window configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct VotingConfig {
    /// Daily cutoff (`HH:MM:SS`). Winners are computed at this time.
    #[serde(default = "default_ends_at")]
    pub ends_at: NaiveTime,
    /// Votes stop being accepted this many seconds before `ends_at`.
    #[serde(default = "default_end_margin_secs")]
    pub end_margin_secs: u64,
    /// IANA timezone the cutoff and the voting date are expressed in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// Root administrator account.
#[derive(Debug, Clone, Deserialize)]
pub struct RootUserConfig {
    /// Login name of the administrator.
    #[serde(default = "default_root_username")]
    pub username: String,
    /// Plain password; bootstrap is skipped while empty.
    #[serde(default)]
    pub password: String,
    /// Contact email of the administrator.
    #[serde(default = "default_root_email")]
    pub email: String,
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    1
}

fn default_ends_at() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)
}

const fn default_end_margin_secs() -> u64 {
    5
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_root_username() -> String {
    "root".to_string()
}

fn default_root_email() -> String {
    "root@email.com".to_string()
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            ends_at: default_ends_at(),
            end_margin_secs: default_end_margin_secs(),
            timezone: default_timezone(),
        }
    }
}

impl Default for RootUserConfig {
    fn default() -> Self {
        Self {
            username: default_root_username(),
            password: String::new(),
            email: default_root_email(),
        }
    }
}

impl VotingConfig {
    /// Parse the configured timezone.
    pub fn tz(&self) -> AppResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| AppError::Config(format!("invalid voting.timezone: {e}")))
    }
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `LUNCH_ENV`)
    /// 3. Environment variables with `LUNCH__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("LUNCH_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("LUNCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("LUNCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
