//! Liveness, uptime and status command handlers.
//!
//! These commands are read-only: they never change state and are available to
//! every sender.

use std::time::Duration;

use log::debug;

use crate::{
    commands::{
        CommandResult,
        markdown_response::{format_bot_info, format_pong, format_status},
    },
    utils::format_uptime,
};

/// Snapshot of the bot state reported by `!status`.
#[derive(Debug)]
pub struct BotStatus {
    /// Time since the bot started
    pub uptime: Duration,
    /// Users with at least one active warning
    pub warned_users: usize,
    /// Known trivia profiles
    pub profiles: usize,
    /// Trivia rounds waiting for an answer
    pub active_rounds: usize,
}

pub fn handle_ping() -> CommandResult {
    debug!("handling ping command");

    CommandResult::reply(format_pong())
}

pub fn handle_bot_info(uptime: Duration) -> CommandResult {
    debug!("handling botinfo command");

    CommandResult::reply(format_bot_info(&format_uptime(uptime)))
}

pub fn handle_status(status: &BotStatus) -> CommandResult {
    debug!("handling status command: {:?}", status);

    CommandResult::reply(format_status(
        &format_uptime(status.uptime),
        status.warned_users,
        status.profiles,
        status.active_rounds,
    ))
}
