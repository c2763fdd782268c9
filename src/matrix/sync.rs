//! Matrix client synchronization and event handling.
//!
//! This module provides the [`MatrixSync`] struct which runs the sync loop and
//! turns room messages into [`InboundMessage`]s.
//!
//! # Overview
//!
//! The [`MatrixSync::sync`] method:
//! 1. Performs an initial sync to skip the backlog and catch pending invites
//! 2. Sets up event handlers for auto-joining rooms and message processing
//! 3. Enters the continuous sync loop

use anyhow::Result;
use std::sync::Arc;

use log::{debug, error, info, warn};
use matrix_sdk::{
    Client, Room, RoomState,
    config::SyncSettings,
    ruma::{
        api::client::filter::FilterDefinition,
        events::room::{
            member::StrippedRoomMemberEvent,
            message::{MessageType, OriginalSyncRoomMessageEvent, Relation},
        },
    },
};
use tokio::time::{Duration, sleep};

use crate::chat::InboundMessage;

/// Delay before retrying a failed initial sync.
const INITIAL_SYNC_RETRY_DELAY: Duration = Duration::from_secs(5);

pub struct MatrixSync {
    client: Client,
}

impl MatrixSync {
    pub fn new(client: &Client) -> Self {
        MatrixSync {
            client: client.to_owned(),
        }
    }

    /// Runs the sync loop, calling `on_message` for every new text message.
    ///
    /// Messages sent by the bot itself are not delivered.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync loop stops.
    pub async fn sync<F>(&self, on_message: F) -> Result<()>
    where
        F: Fn(InboundMessage) + Send + Sync + 'static,
    {
        info!("start syncing");

        // Auto join rooms when invited
        self.client.add_event_handler(auto_join_rooms);

        // Enable room members lazy-loading
        // See <https://spec.matrix.org/v1.6/client-server-api/#lazy-loading-room-members>.
        let filter = FilterDefinition::with_lazy_loading();
        let sync_settings = SyncSettings::default().filter(filter.into());

        // First sync to skip the messages sent while the bot was offline
        let response = loop {
            match self.client.sync_once(sync_settings.clone()).await {
                Ok(response) => break response,
                Err(error) => {
                    error!("an error occurred during initial sync: {error}");
                    error!("trying again in {}s", INITIAL_SYNC_RETRY_DELAY.as_secs());
                    sleep(INITIAL_SYNC_RETRY_DELAY).await;
                }
            }
        };

        let on_message = Arc::new(on_message);

        // Listen to incoming room messages. Because we are listening after the sync_once,
        // we only get new messages.
        self.client.add_event_handler({
            let on_message = Arc::clone(&on_message);
            move |event: OriginalSyncRoomMessageEvent, room: Room, client: Client| {
                let on_message = Arc::clone(&on_message);
                async move { on_room_message(event, room, client, on_message.as_ref()) }
            }
        });

        info!("client is ready");

        // Since we called `sync_once` before we entered our sync loop we must pass
        // that sync token to `sync`
        self.client
            .sync(sync_settings.token(response.next_batch))
            .await?;

        Ok(())
    }
}

async fn auto_join_rooms(room_member: StrippedRoomMemberEvent, client: Client, room: Room) {
    let Some(user_id) = client.user_id() else {
        warn!("could not get user id from client");
        return;
    };

    // Ignore if the invite is not for us
    if room_member.state_key != user_id {
        return;
    }

    tokio::spawn(async move {
        info!("auto joining room {}", room.room_id());
        let mut delay = 2;

        while let Err(err) = room.join().await {
            // retry autojoin due to synapse sending invites, before the
            // invited user can join for more information see
            // https://github.com/matrix-org/synapse/issues/4345
            error!(
                "failed to join room {} ({err:?}), retrying in {delay}s",
                room.room_id()
            );

            sleep(Duration::from_secs(delay)).await;
            delay *= 2;

            if delay > 3600 {
                error!("can't join room {} ({err:?})", room.room_id());
                return;
            }
        }
        info!("successfully joined room {}", room.room_id());
    });
}

fn on_room_message<F>(
    event: OriginalSyncRoomMessageEvent,
    room: Room,
    client: Client,
    on_message: &F,
) where
    F: Fn(InboundMessage),
{
    // Ignore messages from non-joined rooms
    if room.state() != RoomState::Joined {
        return;
    }

    // Ignore our own messages, including the trivia prompts
    if client.user_id() == Some(&*event.sender) {
        return;
    }

    let in_reply_to = match &event.content.relates_to {
        Some(Relation::Reply { in_reply_to }) => Some(in_reply_to.event_id.to_string()),
        _ => None,
    };

    // Only handle text messages
    let MessageType::Text(text_content) = event.content.msgtype else {
        return;
    };

    debug!("message {} from {}", event.event_id, event.sender);

    on_message(InboundMessage {
        body: strip_reply_fallback(&text_content.body).to_owned(),
        room_id: room.room_id().to_string(),
        sender_id: event.sender.to_string(),
        event_id: event.event_id.to_string(),
        in_reply_to,
    });
}

/// Removes the quote some clients prepend to the body of a reply.
///
/// The fallback is a block of lines starting with `> ` followed by an empty line.
fn strip_reply_fallback(body: &str) -> &str {
    if !body.starts_with("> ") {
        return body;
    }

    match body.split_once("\n\n") {
        Some((quote, rest)) if quote.lines().all(|line| line.starts_with('>')) => rest,
        _ => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_reply_fallback() {
        assert_eq!(
            strip_reply_fallback("> <@alice:example.com> sent an image.\n\n!get"),
            "!get"
        );
        assert_eq!(
            strip_reply_fallback(
                "> <@alice:example.com> first line\n> second line\n\n!warn @bob spam"
            ),
            "!warn @bob spam"
        );
    }

    #[test]
    fn test_strip_reply_fallback_keeps_plain_messages() {
        assert_eq!(strip_reply_fallback("!ping"), "!ping");
        assert_eq!(strip_reply_fallback("France"), "France");
        assert_eq!(
            strip_reply_fallback("> quoting without reply"),
            "> quoting without reply"
        );
    }

    #[test]
    fn test_strip_reply_fallback_needs_full_quote_block() {
        let body = "> quote\nnot a quote\n\n!ping";
        assert_eq!(strip_reply_fallback(body), body);
    }
}
