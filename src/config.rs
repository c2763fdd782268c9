//! Configuration file structures for the Marshal bot.
//!
//! The configuration is read from a YAML file and can be overridden with
//! environment variables prefixed with `MARSHAL_`, nested keys being separated
//! by `__` (e.g. `MARSHAL_MATRIX__PASSWORD`).
//!
//! # Configuration File Format
//!
//! ```yaml
//! # Matrix account of the bot
//! matrix:
//!   user_id: "@marshal:matrix.org"
//!   password: "secret-password"
//!
//! # Flag guessing game, every key is optional
//! game:
//!   daily_quota: 5
//!   round_seconds: 30
//!   reward: 10
//!
//! # Moderation, every key is optional
//! moderation:
//!   warning_threshold: 3
//! ```

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;

use crate::trivia::GameSettings;

/// Prefix of the environment variables overriding the file.
const ENV_PREFIX: &str = "MARSHAL_";

/// Root configuration structure for the Marshal bot.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Matrix account configuration
    pub matrix: Matrix,
    /// Flag guessing game configuration
    #[serde(default)]
    pub game: Game,
    /// Moderation configuration
    #[serde(default)]
    pub moderation: Moderation,
}

impl Config {
    /// Loads the configuration from the YAML file at `path`, then applies the
    /// environment overrides.
    ///
    /// A missing file is not an error as long as the environment provides the
    /// required keys.
    ///
    /// # Errors
    ///
    /// Returns an error if a required key is missing or a value has the wrong type.
    pub fn load(path: &str) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
    }
}

/// Matrix account configuration.
#[derive(Debug, Deserialize)]
pub struct Matrix {
    /// Fully qualified Matrix user ID, e.g. `@marshal:matrix.org`.
    pub user_id: String,

    /// Matrix account password.
    ///
    /// The bot logs in with it on every start.
    pub password: String,
}

/// Flag guessing game configuration.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Game {
    /// Rounds a user may play per calendar day
    pub daily_quota: u32,
    /// Seconds given to answer a round
    pub round_seconds: u64,
    /// Points credited for a correct answer
    pub reward: u64,
}

impl Default for Game {
    fn default() -> Self {
        Game {
            daily_quota: 5,
            round_seconds: 30,
            reward: 10,
        }
    }
}

impl From<&Game> for GameSettings {
    fn from(game: &Game) -> Self {
        GameSettings {
            daily_quota: game.daily_quota,
            round_duration: Duration::from_secs(game.round_seconds),
            reward: game.reward,
        }
    }
}

/// Moderation configuration.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Moderation {
    /// Warning count at which a user is removed from the room
    pub warning_threshold: u32,
}

impl Default for Moderation {
    fn default() -> Self {
        Moderation {
            warning_threshold: 3,
        }
    }
}
