//! Matrix client wrapper implementing [`ChatClient`].
//!
//! This module provides the [`MatrixClient`] which wraps the Matrix SDK client,
//! runs the sync loop and answers every collaborator request of the bot: replies,
//! permission lookups, kicks and quoted media.

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use log::{debug, info, warn};
use matrix_sdk::{
    Client, Room,
    media::{MediaFormat, MediaRequestParameters},
    ruma::{
        EventId, RoomId, UserId,
        events::{
            AnySyncMessageLikeEvent, AnySyncTimelineEvent, SyncMessageLikeEvent,
            room::message::{
                AddMentions, ForwardThread, MessageType, ReplyMetadata, RoomMessageEventContent,
            },
        },
    },
};
use serde_json::Value;

use crate::{
    chat::{ChatClient, InboundMessage, MediaKind, QuotedMessage},
    matrix::{UserCredentials, login::login, sync::MatrixSync},
};

/// Content keys flagging a media as viewable once.
const VIEW_ONCE_KEYS: [&str; 2] = ["org.matrix.msc2228.self_destruct", "m.self_destruct"];

/// Display name of the bot account.
const DISPLAY_NAME: &str = "Marshal";

pub struct MatrixClient {
    client: Client,
}

impl MatrixClient {
    /// Logs in and prepares the bot account.
    ///
    /// # Errors
    ///
    /// Returns an error if the login fails.
    pub async fn new(user_credentials: &UserCredentials) -> Result<Self, anyhow::Error> {
        let client = login(user_credentials).await?;

        if let Err(e) = client.account().set_display_name(Some(DISPLAY_NAME)).await {
            warn!("failed to set display name: {:?}", e);
        }

        Ok(MatrixClient { client })
    }

    /// Runs the sync loop until it fails.
    ///
    /// `on_message` is called for every new text message sent by someone else
    /// than the bot.
    pub async fn sync<F>(&self, on_message: F) -> Result<(), anyhow::Error>
    where
        F: Fn(InboundMessage) + Send + Sync + 'static,
    {
        MatrixSync::new(&self.client)
            .sync(on_message)
            .await
            .context("matrix sync ended with error")?;

        info!("matrix sync ended successfully");
        Ok(())
    }

    fn room(&self, room_id: &str) -> anyhow::Result<Room> {
        let room_id = RoomId::parse(room_id)?;
        self.client
            .get_room(&room_id)
            .ok_or_else(|| anyhow!("unknown room {}", room_id))
    }

    /// Fetches the room message `event_id` of `room_id`.
    ///
    /// Returns the message type with the raw event, or `None` when the event is
    /// not a room message.
    async fn fetch_room_message(
        &self,
        room_id: &str,
        event_id: &str,
    ) -> anyhow::Result<Option<(MessageType, Value)>> {
        let room = self.room(room_id)?;
        let event_id = EventId::parse(event_id)?;
        let event = room
            .event(&event_id, None)
            .await
            .with_context(|| format!("failed to fetch event {}", event_id))?;

        let raw = event.raw();
        let json: Value = serde_json::from_str(raw.json().get())?;

        match raw.deserialize()? {
            AnySyncTimelineEvent::MessageLike(AnySyncMessageLikeEvent::RoomMessage(
                SyncMessageLikeEvent::Original(message),
            )) => Ok(Some((message.content.msgtype, json))),
            _ => {
                debug!("event {} is not a room message", event_id);
                Ok(None)
            }
        }
    }

    fn reply_content(
        origin: &InboundMessage,
        content: RoomMessageEventContent,
    ) -> anyhow::Result<RoomMessageEventContent> {
        let sender = UserId::parse(&origin.sender_id)?;
        let event = EventId::parse(&origin.event_id)?;

        Ok(content.make_reply_to(
            ReplyMetadata::new(&event, &sender, None),
            ForwardThread::No,
            AddMentions::No,
        ))
    }
}

#[async_trait]
impl ChatClient for MatrixClient {
    async fn reply(&self, origin: &InboundMessage, body: &str) -> anyhow::Result<()> {
        let content = Self::reply_content(origin, RoomMessageEventContent::text_markdown(body))?;

        self.room(&origin.room_id)?
            .send(content)
            .await
            .with_context(|| format!("failed to reply to {}", origin.event_id))?;

        Ok(())
    }

    async fn is_elevated(&self, room_id: &str, user_id: &str) -> anyhow::Result<bool> {
        let room = self.room(room_id)?;

        // Direct chats are not groups, nobody moderates them
        if room.is_direct().await? {
            return Ok(false);
        }

        let user_id = UserId::parse(user_id)?;
        Ok(room.power_levels().await?.user_can_kick(&user_id))
    }

    async fn remove_participant(
        &self,
        room_id: &str,
        user_id: &str,
        reason: &str,
    ) -> anyhow::Result<()> {
        let user_id = UserId::parse(user_id)?;

        self.room(room_id)?
            .kick_user(&user_id, Some(reason))
            .await
            .with_context(|| format!("failed to kick {} from {}", user_id, room_id))?;

        info!("kicked {} from {}", user_id, room_id);
        Ok(())
    }

    async fn quoted_message(
        &self,
        origin: &InboundMessage,
    ) -> anyhow::Result<Option<QuotedMessage>> {
        let Some(quoted_id) = &origin.in_reply_to else {
            return Ok(None);
        };

        let Some((msgtype, json)) = self.fetch_room_message(&origin.room_id, quoted_id).await?
        else {
            return Ok(None);
        };

        Ok(Some(QuotedMessage {
            event_id: quoted_id.clone(),
            kind: media_kind(&msgtype),
            view_once: is_view_once(&json),
            content: serde_json::to_value(&msgtype)?,
        }))
    }

    async fn download_media(&self, quoted: &QuotedMessage) -> anyhow::Result<Option<Vec<u8>>> {
        let source = match quoted_msgtype(quoted)? {
            MessageType::Image(content) => content.source,
            MessageType::Video(content) => content.source,
            MessageType::Audio(content) => content.source,
            MessageType::File(content) => content.source,
            _ => return Ok(None),
        };

        let request = MediaRequestParameters {
            source,
            format: MediaFormat::File,
        };
        let data = self
            .client
            .media()
            .get_media_content(&request, true)
            .await
            .with_context(|| format!("failed to download media of {}", quoted.event_id))?;

        debug!("downloaded {} byte(s) from {}", data.len(), quoted.event_id);
        Ok(Some(data))
    }

    async fn reply_with_media(
        &self,
        origin: &InboundMessage,
        quoted: &QuotedMessage,
    ) -> anyhow::Result<()> {
        let msgtype = quoted_msgtype(quoted)?;
        let content = Self::reply_content(origin, RoomMessageEventContent::new(msgtype))?;

        self.room(&origin.room_id)?
            .send(content)
            .await
            .with_context(|| format!("failed to send media reply to {}", origin.event_id))?;

        Ok(())
    }
}

fn quoted_msgtype(quoted: &QuotedMessage) -> anyhow::Result<MessageType> {
    serde_json::from_value(quoted.content.clone())
        .with_context(|| format!("invalid content for quoted event {}", quoted.event_id))
}

fn media_kind(msgtype: &MessageType) -> MediaKind {
    match msgtype {
        MessageType::Image(_) => MediaKind::Image,
        MessageType::Video(_) => MediaKind::Video,
        MessageType::Audio(_) => MediaKind::Audio,
        MessageType::File(_) => MediaKind::File,
        _ => MediaKind::Text,
    }
}

/// Whether the content of a raw event carries a self-destruct marker.
///
/// A marker set to `false` does not count.
fn is_view_once(event: &Value) -> bool {
    let Some(content) = event.get("content") else {
        return false;
    };

    VIEW_ONCE_KEYS.iter().any(|key| match content.get(*key) {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Null) | None => false,
        Some(_) => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrix_sdk::ruma::events::room::MediaSource;
    use serde_json::json;

    #[test]
    fn test_is_view_once_with_unstable_key() {
        let event = json!({
            "type": "m.room.message",
            "content": {
                "msgtype": "m.image",
                "body": "photo.png",
                "org.matrix.msc2228.self_destruct": true
            }
        });

        assert!(is_view_once(&event));
    }

    #[test]
    fn test_is_view_once_with_stable_key_object() {
        let event = json!({
            "content": {
                "msgtype": "m.video",
                "m.self_destruct": { "after": "viewed" }
            }
        });

        assert!(is_view_once(&event));
    }

    #[test]
    fn test_is_not_view_once() {
        let plain = json!({ "content": { "msgtype": "m.image", "body": "photo.png" } });
        let disabled = json!({ "content": { "m.self_destruct": false } });
        let no_content = json!({ "type": "m.room.message" });

        assert!(!is_view_once(&plain));
        assert!(!is_view_once(&disabled));
        assert!(!is_view_once(&no_content));
    }

    #[test]
    fn test_quoted_content_keeps_the_media_source() {
        let msgtype: MessageType = serde_json::from_value(json!({
            "msgtype": "m.image",
            "body": "photo.png",
            "url": "mxc://example.com/abcdef"
        }))
        .unwrap();
        let quoted = QuotedMessage {
            event_id: "$media".to_string(),
            kind: media_kind(&msgtype),
            view_once: true,
            content: serde_json::to_value(&msgtype).unwrap(),
        };

        match quoted_msgtype(&quoted).unwrap() {
            MessageType::Image(content) => {
                assert_eq!(content.body, "photo.png");
                let MediaSource::Plain(uri) = content.source else {
                    panic!("Expected an unencrypted media source");
                };
                assert_eq!(uri.as_str(), "mxc://example.com/abcdef");
            }
            other => panic!("Expected an image, got {:?}", other),
        }
        assert_eq!(quoted.kind, MediaKind::Image);
    }

    #[test]
    fn test_media_kind() {
        assert_eq!(
            media_kind(&MessageType::text_plain("hello")),
            MediaKind::Text
        );
    }
}
