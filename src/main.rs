//! Marshal - A Matrix bot for room moderation and a flag guessing game.
//!
//! # Overview
//!
//! Marshal joins the Matrix rooms it is invited to and answers commands starting
//! with `!`. Room moderators can warn and kick members, everyone can play a flag
//! guessing game with a daily quota and earn points.
//!
//! # Configuration
//!
//! Create a `config.yaml` file with your settings:
//!
//! ```yaml
//! matrix:
//!   user_id: "@marshal:matrix.org"
//!   password: "your-password"
//!
//! game:
//!   daily_quota: 5
//!   round_seconds: 30
//!   reward: 10
//!
//! moderation:
//!   warning_threshold: 3
//! ```
//!
//! # Environment Variable Overrides
//!
//! Override any configuration value using environment variables with the `MARSHAL_` prefix:
//!
//! ```bash
//! export MARSHAL_MATRIX__USER_ID="@marshal:matrix.org"
//! export MARSHAL_MATRIX__PASSWORD="your-password"
//! ```
//!
//! # Usage
//!
//! ```bash
//! marshal --config config.yaml --data ./data
//! ```
//!
//! # Bot Commands
//!
//! - `!help` - Display help information
//! - `!guessflag` - Guess the country of a flag, 30 seconds to answer
//! - `!ping` - Check that the bot is online
//! - `!botinfo` - Bot uptime
//! - `!status` - Bot status
//! - `!get` - Reply to a view-once media to retrieve it
//! - `!warn <user> <reason>` - Warn a user, the third warning removes them (moderators)
//! - `!delwarn <user>` - Remove a warning (moderators)
//! - `!listwarn <user>` - List the warnings of a user (moderators)
//! - `!kick <user>` - Remove a user from the room (moderators)
//!
//! # Architecture
//!
//! - [`bot`] - Wires the Matrix client to the dispatcher and the trivia answer stream
//! - [`chat`] - Narrow interface to the chat network
//! - [`commands`] - Command parsing, permission routing and responses
//! - [`config`] - YAML configuration with environment overrides
//! - [`matrix`] - Matrix implementation of the chat network
//! - [`media`] - Storage of retrieved media
//! - [`moderation`] - Warning ledger
//! - [`profiles`] - Player profiles and daily quota, persisted as JSON
//! - [`trivia`] - Flag guessing game
//! - [`utils`] - Small helpers
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use crate::{bot::Bot, config::Config};

mod bot;
mod chat;
mod commands;
mod config;
mod matrix;
mod media;
mod moderation;
mod profiles;
mod trivia;
mod utils;

/// Command-line arguments for the Marshal bot.
///
/// Most configuration is done through the YAML file (see [`config::Config`]).
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Path to the directory for storing persistent data.
    ///
    /// This directory will contain:
    /// - `user-data.json` - Trivia profiles of the players
    /// - `saved-media/` - Media retrieved with `!get`
    #[arg(short, long, default_value = "./data")]
    data: String,
}

#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    info!("Starting marshal {}...", env!("CARGO_PKG_VERSION"));

    // Parse command line arguments
    let args = Args::parse();

    // Load configuration from YAML file with environment variable overrides
    let config = match Config::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load config file: {}", e);
            return;
        }
    };

    // Launch bot
    let bot = match Bot::new(config, &args.data).await {
        Ok(b) => b,
        Err(e) => {
            error!("Failed to initialize bot: {:#}", e);
            return;
        }
    };
    bot.start().await;
}
