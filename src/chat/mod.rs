//! Narrow interface to the messaging network.
//!
//! Everything the bot needs from the chat network goes through the [`ChatClient`]
//! trait: replying, permission lookups, removing a member and fetching quoted media.
//! The Matrix implementation lives in [`crate::matrix`]; tests use the generated
//! `MockChatClient`.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde_json::Value;

/// A text message received from a room.
///
/// This is what flows through the inbound event stream, both to the command
/// dispatcher and to the trivia rounds waiting for an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Raw text of the message
    pub body: String,
    /// Room where the message was sent
    pub room_id: String,
    /// User who sent the message
    pub sender_id: String,
    /// Event id of the message, used to reply to it
    pub event_id: String,
    /// Event id of the message this one replies to, if any
    pub in_reply_to: Option<String>,
}

/// Kind of content carried by a quoted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    File,
    Text,
}

impl MediaKind {
    /// File extension used when saving media of this kind.
    ///
    /// Only images and videos have a dedicated extension, everything else is
    /// saved as raw `bin`.
    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::Image => "png",
            MediaKind::Video => "mp4",
            _ => "bin",
        }
    }
}

/// The message quoted by a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotedMessage {
    /// Event id of the quoted message
    pub event_id: String,
    /// What the quoted message carries
    pub kind: MediaKind,
    /// Whether the sender flagged the media to be viewed only once
    pub view_once: bool,
    /// Network-specific content of the message, enough to download and repost
    /// the media without fetching the message again
    pub content: Value,
}

/// Operations consumed from the messaging network.
///
/// Implementations must be shareable across tasks: the dispatcher handles every
/// message in its own task and trivia rounds outlive the command that started them.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Replies to `origin` in its room.
    async fn reply(&self, origin: &InboundMessage, body: &str) -> anyhow::Result<()>;

    /// Whether `user_id` holds moderator rights in `room_id`.
    ///
    /// Direct chats never grant elevated permission.
    async fn is_elevated(&self, room_id: &str, user_id: &str) -> anyhow::Result<bool>;

    /// Removes `user_id` from `room_id`.
    async fn remove_participant(
        &self,
        room_id: &str,
        user_id: &str,
        reason: &str,
    ) -> anyhow::Result<()>;

    /// Resolves the message `origin` replies to.
    ///
    /// Returns `None` when `origin` is not a reply or the quoted event is not a
    /// room message.
    async fn quoted_message(&self, origin: &InboundMessage)
    -> anyhow::Result<Option<QuotedMessage>>;

    /// Downloads the media carried by `quoted`.
    ///
    /// Returns `None` when the quoted message carries no downloadable media.
    async fn download_media(&self, quoted: &QuotedMessage) -> anyhow::Result<Option<Vec<u8>>>;

    /// Replies to `origin` with the media of `quoted`.
    async fn reply_with_media(
        &self,
        origin: &InboundMessage,
        quoted: &QuotedMessage,
    ) -> anyhow::Result<()>;
}
