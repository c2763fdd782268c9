//! Command action handlers.
//!
//! Individual handler functions for each bot command. Handlers receive the state
//! they need, process the command and return a [`CommandResult`](crate::commands::CommandResult).
//!
//! # Available Handlers
//!
//! - [`handle_help`] - Display help information
//! - [`handle_ping`], [`handle_bot_info`], [`handle_status`] - Liveness and status reports
//! - [`handle_get`] - Retrieve a view-once media
//! - [`handle_warn`], [`handle_delwarn`], [`handle_listwarn`], [`handle_kick`] - Moderation
//!
//! # State Changes
//!
//! Handlers don't talk to the room directly, except [`handle_get`] which has to post
//! the media. Removals are returned via `participant_to_remove` in the
//! [`CommandResult`](crate::commands::CommandResult).

mod help;
mod info;
mod media;
mod moderation;

pub use crate::commands::actions::{
    help::handle_help,
    info::{BotStatus, handle_bot_info, handle_ping, handle_status},
    media::handle_get,
    moderation::{handle_delwarn, handle_kick, handle_listwarn, handle_warn},
};
