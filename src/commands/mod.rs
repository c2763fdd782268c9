//! Bot command parsing, routing and response formatting.
//!
//! This module provides the complete command processing pipeline: a chat message
//! comes in, is parsed into a [`command::Command`], checked against the sender's
//! permission, routed to its handler and answered with a Markdown reply.
//!
//! # Architecture
//!
//! ```text
//! InboundMessage
//!      │
//!      ▼
//! ┌─────────────┐
//! │ Dispatcher  │  ← Entry point: handle()
//! └─────────────┘
//!      │
//!      ├── Command::parse() ──────────┐
//!      │                              ▼
//!      │                   ┌──────────────────┐
//!      │                   │ command::Command │
//!      │                   └──────────────────┘
//!      │
//!      ├── permission check (ChatClient::is_elevated)
//!      │
//!      └── routing ───────────────────┐
//!                                     ▼
//!                          ┌─────────────────────┐
//!                          │ Action Handlers     │
//!                          │  - handle_help      │
//!                          │  - handle_ping      │
//!                          │  - handle_bot_info  │
//!                          │  - handle_status    │
//!                          │  - handle_get       │
//!                          │  - handle_warn      │
//!                          │  - handle_delwarn   │
//!                          │  - handle_listwarn  │
//!                          │  - handle_kick      │
//!                          └─────────────────────┘
//!                                     │
//!                                     ▼
//!                          ┌──────────────────────────┐
//!                          │  CommandResult           │
//!                          │  - response (MD)         │
//!                          │  - participant_to_remove │
//!                          └──────────────────────────┘
//! ```
//!
//! `!guessflag` bypasses the handlers: the [`TriviaManager`](crate::trivia::TriviaManager)
//! sends its own replies while the round runs.
//!
//! # Command Structure
//!
//! | Command | Arguments | Elevated | Description |
//! |---------|-----------|----------|-------------|
//! | `!help` | None | No | Display help information |
//! | `!guessflag` | None | No | Start a flag trivia round |
//! | `!ping` | None | No | Liveness check |
//! | `!botinfo` | None | No | Uptime report |
//! | `!status` | None | No | Status report |
//! | `!get` | None, reply to a message | No | Retrieve a view-once media |
//! | `!warn` | `<user> <reason...>` | Yes | Warn a user, 3 warnings remove them |
//! | `!delwarn` | `<user>` | Yes | Remove a warning |
//! | `!listwarn` | `<user>` | Yes | List the warnings of a user |
//! | `!kick` | `<user>` | Yes | Remove a user from the room |
//!
//! # Error Handling
//!
//! - Messages that are not commands are ignored silently.
//! - Non-elevated users get a permission-denied reply for admin commands and for
//!   unknown commands. Elevated users get a usage or unknown-command reply instead.
//! - Any error raised while handling a command is logged and answered with a
//!   generic error reply; it never reaches the sync loop.

mod actions;
pub mod command;
mod dispatcher;
pub mod markdown_response;

pub use crate::commands::dispatcher::Dispatcher;

/// Result of command execution.
///
/// Handlers don't talk to the chat network directly. They return the reply and
/// the removal to perform, the [`Dispatcher`] applies the removal before replying.
#[derive(Debug, PartialEq, Eq)]
pub struct CommandResult {
    /// Markdown-formatted response message
    pub response: String,
    /// Optional user to remove from the room: (user_id, reason)
    pub participant_to_remove: Option<(String, String)>,
}

impl CommandResult {
    /// A result that only replies.
    pub fn reply(response: String) -> Self {
        CommandResult {
            response,
            participant_to_remove: None,
        }
    }
}
