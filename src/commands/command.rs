//! Command parsing.
//!
//! This module converts the text of a chat message into a structured [`Command`].
//! Commands start with [`COMMAND_MARKER`], the first token is the command name, the
//! second one a target user and the remaining tokens a free-text reason. Command
//! names are case-sensitive.

use log::debug;
use matrix_sdk::ruma::UserId;

use crate::commands::markdown_response::{
    format_invalid_delwarn, format_invalid_kick, format_invalid_listwarn, format_invalid_warn,
    format_unknown_command,
};

/// Character every command starts with.
pub const COMMAND_MARKER: char = '!';

/// Represents a parsed bot command.
#[derive(Debug, Hash, PartialEq, Eq)]
pub enum Command {
    /// Display help information
    Help,
    /// Start a flag trivia round
    GuessFlag,
    /// Liveness check
    Ping,
    /// Report the uptime
    BotInfo,
    /// Report the bot status
    Status,
    /// Retrieve the quoted view-once media
    Get,
    /// Warn a user
    Warn {
        /// Full user id of the warned user
        target: String,
        /// Reason of the warning
        reason: String,
    },
    /// Remove one warning of a user
    ///
    /// # Fields
    ///
    /// * `String` - Full user id
    DelWarn(String),
    /// List the warnings of a user
    ///
    /// # Fields
    ///
    /// * `String` - Full user id
    ListWarn(String),
    /// Remove a user from the room
    ///
    /// # Fields
    ///
    /// * `String` - Full user id
    Kick(String),
}

/// Errors that can occur during command parsing.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandParsingError {
    /// The message is not a command
    NotACommand,
    /// The command is not recognized, holds its name
    Unknown(String),
    /// The warn command has a missing target or reason
    InvalidWarn,
    /// The delwarn command has a missing target
    InvalidDelWarn,
    /// The listwarn command has a missing target
    InvalidListWarn,
    /// The kick command has a missing target
    InvalidKick,
}

impl CommandParsingError {
    /// Whether the sender must be elevated to be told about this error.
    ///
    /// Non-elevated users only get a permission-denied reply for anything that is
    /// not a known general command.
    pub fn requires_elevation(&self) -> bool {
        !matches!(self, CommandParsingError::NotACommand)
    }
}

impl Command {
    /// Parses a message body into a Command.
    ///
    /// # Arguments
    ///
    /// * `body` - The message text to parse
    /// * `sender_id` - Sender of the message, used to complete short target references
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The message does not start with the marker - [`CommandParsingError::NotACommand`]
    /// - The command is not recognized - [`CommandParsingError::Unknown`]
    /// - An admin command misses its target or reason - `Invalid*` variants
    ///
    /// # Examples
    ///
    /// ```
    /// # use marshal::commands::command::Command;
    /// let result = Command::parse("!kick @bob", "@alice:example.com");
    /// assert_eq!(result, Ok(Command::Kick("@bob:example.com".to_string())));
    /// ```
    pub fn parse(body: &str, sender_id: &str) -> Result<Self, CommandParsingError> {
        let Some(stripped) = body.strip_prefix(COMMAND_MARKER) else {
            return Err(CommandParsingError::NotACommand);
        };

        let tokens: Vec<&str> = stripped.split_whitespace().collect();
        let Some(name) = tokens.first() else {
            return Err(CommandParsingError::NotACommand);
        };
        // "! help" is chat, not a command
        if stripped.starts_with(char::is_whitespace) {
            return Err(CommandParsingError::NotACommand);
        }

        debug!("Parsing command: {:?}", tokens);

        let target = tokens.get(1).and_then(|t| resolve_target(t, sender_id));

        match *name {
            "help" => Ok(Command::Help),
            "guessflag" => Ok(Command::GuessFlag),
            "ping" => Ok(Command::Ping),
            "botinfo" => Ok(Command::BotInfo),
            "status" => Ok(Command::Status),
            "get" => Ok(Command::Get),
            "warn" => {
                let reason = tokens.get(2..).map(|r| r.join(" ")).unwrap_or_default();
                match target {
                    Some(target) if !reason.is_empty() => Ok(Command::Warn { target, reason }),
                    _ => Err(CommandParsingError::InvalidWarn),
                }
            }
            "delwarn" => target
                .map(Command::DelWarn)
                .ok_or(CommandParsingError::InvalidDelWarn),
            "listwarn" => target
                .map(Command::ListWarn)
                .ok_or(CommandParsingError::InvalidListWarn),
            "kick" => target
                .map(Command::Kick)
                .ok_or(CommandParsingError::InvalidKick),
            _ => Err(CommandParsingError::Unknown((*name).to_owned())),
        }
    }

    /// Whether the command is reserved to elevated users.
    pub fn requires_elevation(&self) -> bool {
        matches!(
            self,
            Command::Warn { .. } | Command::DelWarn(_) | Command::ListWarn(_) | Command::Kick(_)
        )
    }
}

/// Resolves a target reference into a full user id.
///
/// A full id (`@user:server`) is kept as is. A short reference (`@user` or `user`)
/// is completed with the homeserver of `sender_id`.
///
/// # Returns
///
/// * `Some(String)` - The full user id
/// * `None` - If the reference cannot form a valid user id
pub fn resolve_target(reference: &str, sender_id: &str) -> Option<String> {
    if let Ok(user_id) = UserId::parse(reference) {
        return Some(user_id.to_string());
    }

    let localpart = reference.strip_prefix('@').unwrap_or(reference);
    if localpart.is_empty() || localpart.contains(':') {
        return None;
    }

    let sender = UserId::parse(sender_id).ok()?;
    UserId::parse(format!("@{}:{}", localpart, sender.server_name()))
        .ok()
        .map(|user_id| user_id.to_string())
}

/// Formats a command error into a user-friendly message.
///
/// # Returns
///
/// * `Some(String)` - A formatted message for user-facing errors
/// * `None` - For messages that are not commands and must not get a response
pub fn format_command_error(error: &CommandParsingError) -> Option<String> {
    match error {
        CommandParsingError::NotACommand => None,
        CommandParsingError::Unknown(name) => Some(format_unknown_command(name)),
        CommandParsingError::InvalidWarn => Some(format_invalid_warn()),
        CommandParsingError::InvalidDelWarn => Some(format_invalid_delwarn()),
        CommandParsingError::InvalidListWarn => Some(format_invalid_listwarn()),
        CommandParsingError::InvalidKick => Some(format_invalid_kick()),
    }
}
