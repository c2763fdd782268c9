//! Command dispatcher for processing chat messages.
//!
//! The [`Dispatcher`] is the entry point of the command pipeline: it parses a
//! message, checks the sender's permission, routes the command to its handler,
//! applies the requested removal and sends the reply.

use std::sync::Arc;

use log::{debug, error, info};
use tokio::{sync::Mutex, time::Instant};

use crate::{
    chat::{ChatClient, InboundMessage},
    commands::{
        CommandResult,
        actions::{
            BotStatus, handle_bot_info, handle_delwarn, handle_get, handle_help, handle_kick,
            handle_listwarn, handle_ping, handle_status, handle_warn,
        },
        command::{Command, CommandParsingError, format_command_error},
        markdown_response::{format_generic_error, format_permission_denied},
    },
    media::MediaVault,
    moderation::ModerationLedger,
    profiles::ProfileStore,
    trivia::TriviaManager,
};

/// Routes chat messages to the moderation ledger, the trivia game and the other
/// command handlers.
///
/// The dispatcher owns the moderation ledger and shares the profile store with the
/// [`TriviaManager`]. It is meant to be shared behind an [`Arc`], every inbound
/// message being handled in its own task.
///
/// # Examples
///
/// ```no_run
/// # use marshal::commands::Dispatcher;
/// # async fn example(dispatcher: Dispatcher<impl marshal::chat::ChatClient>, message: marshal::chat::InboundMessage) {
/// // Never fails: errors are logged and answered with a generic reply
/// dispatcher.handle(&message).await;
/// # }
/// ```
pub struct Dispatcher<C: ChatClient> {
    /// Client used to reply and to look permissions up
    client: Arc<C>,
    /// Warnings of the users
    ledger: Mutex<ModerationLedger>,
    /// Player profiles, shared with the trivia manager
    profiles: Arc<Mutex<ProfileStore>>,
    /// Flag guessing game
    trivia: TriviaManager<C>,
    /// Storage of retrieved media
    vault: MediaVault,
    /// Start of the bot, for uptime reports
    started_at: Instant,
}

impl<C: ChatClient> Dispatcher<C> {
    pub fn new(
        client: Arc<C>,
        ledger: ModerationLedger,
        profiles: Arc<Mutex<ProfileStore>>,
        trivia: TriviaManager<C>,
        vault: MediaVault,
    ) -> Self {
        Dispatcher {
            client,
            ledger: Mutex::new(ledger),
            profiles,
            trivia,
            vault,
            started_at: Instant::now(),
        }
    }

    /// Handles an inbound message.
    ///
    /// Any error raised while handling the message is logged and answered with a
    /// generic error reply. Failing to send that reply is only logged.
    pub async fn handle(&self, message: &InboundMessage) {
        if let Err(e) = self.dispatch(message).await {
            error!(
                "failed to handle message {} from {}: {:#}",
                message.event_id, message.sender_id, e
            );

            if let Err(e) = self.client.reply(message, &format_generic_error()).await {
                error!("failed to send error reply to {}: {:#}", message.event_id, e);
            }
        }
    }

    async fn dispatch(&self, message: &InboundMessage) -> anyhow::Result<()> {
        let command = match Command::parse(&message.body, &message.sender_id) {
            Ok(command) => command,
            // Return silently if the message is not a command
            Err(CommandParsingError::NotACommand) => return Ok(()),
            Err(e) => return self.reply_parsing_error(message, e).await,
        };

        debug!(
            "routing {:?} from {} in {}",
            command, message.sender_id, message.room_id
        );

        if command.requires_elevation() && !self.is_elevated(message).await? {
            info!("{} is not allowed to use {:?}", message.sender_id, command);
            return self
                .client
                .reply(message, &format_permission_denied())
                .await;
        }

        let result = match command {
            Command::Help => handle_help(self.is_elevated(message).await?),
            Command::GuessFlag => {
                // The trivia manager sends its own replies
                self.trivia.play(message).await?;
                return Ok(());
            }
            Command::Ping => handle_ping(),
            Command::BotInfo => handle_bot_info(self.started_at.elapsed()),
            Command::Status => handle_status(&self.status().await),
            Command::Get => match handle_get(self.client.as_ref(), &self.vault, message).await? {
                Some(result) => result,
                None => return Ok(()),
            },
            Command::Warn { target, reason } => {
                handle_warn(&mut *self.ledger.lock().await, &target, &reason)
            }
            Command::DelWarn(target) => handle_delwarn(&mut *self.ledger.lock().await, &target),
            Command::ListWarn(target) => handle_listwarn(&*self.ledger.lock().await, &target),
            Command::Kick(target) => handle_kick(&target, &message.sender_id),
        };

        self.apply(message, result).await
    }

    /// Performs the removal requested by `result`, then sends its reply.
    ///
    /// The warnings of a removed user are dropped only once the removal
    /// succeeded, a failed removal keeps them.
    async fn apply(&self, message: &InboundMessage, result: CommandResult) -> anyhow::Result<()> {
        if let Some((user_id, reason)) = &result.participant_to_remove {
            info!(
                "removing {} from {} on behalf of {}",
                user_id, message.room_id, message.sender_id
            );
            self.client
                .remove_participant(&message.room_id, user_id, reason)
                .await?;

            if let Some(record) = self.ledger.lock().await.clear(user_id) {
                debug!("cleared {} warning(s) of {}", record.count, user_id);
            }
        }

        self.client.reply(message, &result.response).await
    }

    /// Answers a command that could not be parsed.
    ///
    /// Only elevated users learn about unknown commands and usage errors, everyone
    /// else is denied.
    async fn reply_parsing_error(
        &self,
        message: &InboundMessage,
        error: CommandParsingError,
    ) -> anyhow::Result<()> {
        debug!("invalid command from {}: {:?}", message.sender_id, error);

        let response = if error.requires_elevation() && !self.is_elevated(message).await? {
            Some(format_permission_denied())
        } else {
            format_command_error(&error)
        };

        match response {
            Some(response) => self.client.reply(message, &response).await,
            None => Ok(()),
        }
    }

    async fn is_elevated(&self, message: &InboundMessage) -> anyhow::Result<bool> {
        self.client
            .is_elevated(&message.room_id, &message.sender_id)
            .await
    }

    async fn status(&self) -> BotStatus {
        BotStatus {
            uptime: self.started_at.elapsed(),
            warned_users: self.ledger.lock().await.len(),
            profiles: self.profiles.lock().await.len(),
            active_rounds: self.trivia.active_rounds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use anyhow::anyhow;
    use tempfile::TempDir;
    use tokio::sync::broadcast;

    use super::*;
    use crate::{
        chat::MockChatClient,
        commands::markdown_response::{
            format_invalid_kick, format_pong, format_unknown_command, format_warned,
        },
        trivia::GameSettings,
        utils::get_path,
    };

    const ROOM: &str = "!room:example.com";
    const ADMIN: &str = "@admin:example.com";
    const MEMBER: &str = "@member:example.com";

    type Replies = Arc<StdMutex<Vec<String>>>;
    type Removals = Arc<StdMutex<Vec<(String, String)>>>;

    fn create_message(sender: &str, body: &str) -> InboundMessage {
        InboundMessage {
            body: body.to_string(),
            room_id: ROOM.to_string(),
            sender_id: sender.to_string(),
            event_id: "$command".to_string(),
            in_reply_to: None,
        }
    }

    /// Mock client where only `ADMIN` is elevated.
    fn create_client() -> (MockChatClient, Replies, Removals) {
        let replies: Replies = Arc::new(StdMutex::new(Vec::new()));
        let removals: Removals = Arc::new(StdMutex::new(Vec::new()));

        let mut client = MockChatClient::new();
        client
            .expect_is_elevated()
            .returning(|_, user_id| Ok(user_id == ADMIN));
        let recorded = Arc::clone(&replies);
        client.expect_reply().returning(move |_, body| {
            recorded.lock().unwrap().push(body.to_string());
            Ok(())
        });
        let recorded = Arc::clone(&removals);
        client
            .expect_remove_participant()
            .returning(move |room_id, user_id, _| {
                recorded
                    .lock()
                    .unwrap()
                    .push((room_id.to_string(), user_id.to_string()));
                Ok(())
            });

        (client, replies, removals)
    }

    async fn create_dispatcher(client: MockChatClient) -> (TempDir, Dispatcher<MockChatClient>) {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().to_str().unwrap().to_string();

        let client = Arc::new(client);
        let profiles = Arc::new(Mutex::new(
            ProfileStore::load(get_path(&data_dir, "user-data.json")).await,
        ));
        let (inbound, _) = broadcast::channel(16);
        let trivia = TriviaManager::new(
            Arc::clone(&client),
            Arc::clone(&profiles),
            inbound,
            GameSettings::default(),
        );

        let dispatcher = Dispatcher::new(
            client,
            ModerationLedger::new(3),
            profiles,
            trivia,
            MediaVault::new(get_path(&data_dir, "saved-media")),
        );

        (temp_dir, dispatcher)
    }

    #[tokio::test]
    async fn test_plain_chat_is_ignored() {
        let mut client = MockChatClient::new();
        client.expect_reply().never();
        client.expect_is_elevated().never();
        let (_dir, dispatcher) = create_dispatcher(client).await;

        dispatcher
            .handle(&create_message(MEMBER, "hello everyone"))
            .await;
    }

    #[tokio::test]
    async fn test_ping_is_available_to_everyone() {
        let (client, replies, _) = create_client();
        let (_dir, dispatcher) = create_dispatcher(client).await;

        dispatcher.handle(&create_message(MEMBER, "!ping")).await;

        assert_eq!(*replies.lock().unwrap(), vec![format_pong()]);
    }

    #[tokio::test]
    async fn test_help_depends_on_permission() {
        let (client, replies, _) = create_client();
        let (_dir, dispatcher) = create_dispatcher(client).await;

        dispatcher.handle(&create_message(MEMBER, "!help")).await;
        dispatcher.handle(&create_message(ADMIN, "!help")).await;

        let replies = replies.lock().unwrap();
        assert!(!replies[0].contains("Admin Commands"));
        assert!(replies[1].contains("Admin Commands"));
    }

    #[tokio::test]
    async fn test_admin_command_denied_for_member() {
        let (client, replies, removals) = create_client();
        let (_dir, dispatcher) = create_dispatcher(client).await;

        dispatcher
            .handle(&create_message(MEMBER, "!kick @admin:example.com"))
            .await;
        dispatcher
            .handle(&create_message(MEMBER, "!warn @admin:example.com spam"))
            .await;

        assert_eq!(
            *replies.lock().unwrap(),
            vec![format_permission_denied(), format_permission_denied()]
        );
        assert!(removals.lock().unwrap().is_empty());
        assert_eq!(dispatcher.ledger.lock().await.len(), 0);
    }

    #[tokio::test]
    async fn test_unknown_command_depends_on_permission() {
        let (client, replies, _) = create_client();
        let (_dir, dispatcher) = create_dispatcher(client).await;

        dispatcher.handle(&create_message(MEMBER, "!dance")).await;
        dispatcher.handle(&create_message(ADMIN, "!dance")).await;

        assert_eq!(
            *replies.lock().unwrap(),
            vec![format_permission_denied(), format_unknown_command("dance")]
        );
    }

    #[tokio::test]
    async fn test_missing_argument_gets_usage_only_when_elevated() {
        let (client, replies, _) = create_client();
        let (_dir, dispatcher) = create_dispatcher(client).await;

        dispatcher.handle(&create_message(MEMBER, "!kick")).await;
        dispatcher.handle(&create_message(ADMIN, "!kick")).await;

        assert_eq!(
            *replies.lock().unwrap(),
            vec![format_permission_denied(), format_invalid_kick()]
        );
    }

    #[tokio::test]
    async fn test_three_warnings_remove_the_user() {
        let (client, replies, removals) = create_client();
        let (_dir, dispatcher) = create_dispatcher(client).await;

        for reason in ["spam", "spam2", "spam3"] {
            dispatcher
                .handle(&create_message(ADMIN, &format!("!warn @u1 {}", reason)))
                .await;
        }

        let replies = replies.lock().unwrap();
        assert_eq!(replies[0], format_warned("@u1:example.com", 1));
        assert_eq!(replies[1], format_warned("@u1:example.com", 2));
        assert!(replies[2].contains("Total warnings: 3"));
        assert_eq!(
            *removals.lock().unwrap(),
            vec![(ROOM.to_string(), "@u1:example.com".to_string())]
        );
        assert!(dispatcher.ledger.lock().await.get("@u1:example.com").is_none());
    }

    #[tokio::test]
    async fn test_kick_removes_and_clears_warnings() {
        let (client, replies, removals) = create_client();
        let (_dir, dispatcher) = create_dispatcher(client).await;

        dispatcher
            .handle(&create_message(ADMIN, "!warn @bob:example.com flood"))
            .await;
        dispatcher
            .handle(&create_message(ADMIN, "!kick @bob:example.com"))
            .await;

        assert_eq!(
            replies.lock().unwrap()[1],
            "User @bob:example.com has been removed."
        );
        assert_eq!(
            *removals.lock().unwrap(),
            vec![(ROOM.to_string(), "@bob:example.com".to_string())]
        );
        assert_eq!(dispatcher.ledger.lock().await.len(), 0);
    }

    #[tokio::test]
    async fn test_listwarn_and_delwarn() {
        let (client, replies, _) = create_client();
        let (_dir, dispatcher) = create_dispatcher(client).await;

        dispatcher
            .handle(&create_message(ADMIN, "!warn @bob spam links"))
            .await;
        dispatcher.handle(&create_message(ADMIN, "!listwarn @bob")).await;
        dispatcher.handle(&create_message(ADMIN, "!delwarn @bob")).await;
        dispatcher.handle(&create_message(ADMIN, "!listwarn @bob")).await;

        let replies = replies.lock().unwrap();
        assert_eq!(replies[1], "Warnings for @bob:example.com:\n1. spam links");
        assert_eq!(
            replies[2],
            "Removed a warning for @bob:example.com. Total warnings: 0"
        );
        assert_eq!(
            replies[3],
            "Warnings for @bob:example.com:\nNo warnings for this user."
        );
    }

    #[tokio::test]
    async fn test_status_reports_state() {
        let (client, replies, _) = create_client();
        let (_dir, dispatcher) = create_dispatcher(client).await;

        dispatcher
            .handle(&create_message(ADMIN, "!warn @bob spam"))
            .await;
        dispatcher.handle(&create_message(MEMBER, "!status")).await;

        let replies = replies.lock().unwrap();
        assert!(replies[1].contains("**warned users**: 1"));
        assert!(replies[1].contains("**player profiles**: 0"));
        assert!(replies[1].contains("**active rounds**: 0"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_botinfo_reports_uptime() {
        let (client, replies, _) = create_client();
        let (_dir, dispatcher) = create_dispatcher(client).await;

        tokio::time::advance(std::time::Duration::from_secs(3723)).await;
        dispatcher.handle(&create_message(MEMBER, "!botinfo")).await;

        assert_eq!(*replies.lock().unwrap(), vec!["Bot uptime: 1h 2m 3s"]);
    }

    #[tokio::test]
    async fn test_failure_is_answered_with_generic_error() {
        let replies: Replies = Arc::new(StdMutex::new(Vec::new()));
        let mut client = MockChatClient::new();
        client.expect_is_elevated().returning(|_, _| Ok(true));
        client
            .expect_remove_participant()
            .returning(|_, _, _| Err(anyhow!("missing power level")));
        let recorded = Arc::clone(&replies);
        client.expect_reply().returning(move |_, body| {
            recorded.lock().unwrap().push(body.to_string());
            Ok(())
        });
        let (_dir, dispatcher) = create_dispatcher(client).await;

        dispatcher
            .handle(&create_message(ADMIN, "!kick @bob:example.com"))
            .await;

        assert_eq!(*replies.lock().unwrap(), vec![format_generic_error()]);
    }

    #[tokio::test]
    async fn test_failed_removal_keeps_warnings() {
        let replies: Replies = Arc::new(StdMutex::new(Vec::new()));
        let mut client = MockChatClient::new();
        client.expect_is_elevated().returning(|_, _| Ok(true));
        client
            .expect_remove_participant()
            .times(3)
            .returning(|_, _, _| Err(anyhow!("missing power level")));
        let recorded = Arc::clone(&replies);
        client.expect_reply().returning(move |_, body| {
            recorded.lock().unwrap().push(body.to_string());
            Ok(())
        });
        let (_dir, dispatcher) = create_dispatcher(client).await;

        for reason in ["spam", "spam2", "spam3"] {
            dispatcher
                .handle(&create_message(ADMIN, &format!("!warn @u1 {}", reason)))
                .await;
        }

        assert_eq!(replies.lock().unwrap()[2], format_generic_error());
        let count = dispatcher
            .ledger
            .lock()
            .await
            .get("@u1:example.com")
            .map(|r| r.count);
        assert_eq!(count, Some(3));

        // The next warning tries the removal again
        dispatcher
            .handle(&create_message(ADMIN, "!warn @u1 spam4"))
            .await;
        dispatcher
            .handle(&create_message(ADMIN, "!kick @u1"))
            .await;
        let count = dispatcher
            .ledger
            .lock()
            .await
            .get("@u1:example.com")
            .map(|r| r.count);
        assert_eq!(count, Some(4));
    }

    #[tokio::test]
    async fn test_failing_error_reply_does_not_panic() {
        let mut client = MockChatClient::new();
        client
            .expect_is_elevated()
            .returning(|_, _| Err(anyhow!("room not found")));
        client
            .expect_reply()
            .times(1)
            .returning(|_, _| Err(anyhow!("connection lost")));
        let (_dir, dispatcher) = create_dispatcher(client).await;

        dispatcher.handle(&create_message(MEMBER, "!help")).await;
    }

    #[tokio::test]
    async fn test_guessflag_quota_reply_goes_through_trivia() {
        let (client, replies, _) = create_client();
        let (_dir, dispatcher) = create_dispatcher(client).await;
        let today = chrono::Utc::now().date_naive();
        {
            let mut profiles = dispatcher.profiles.lock().await;
            for _ in 0..5 {
                profiles.try_start(MEMBER, today, 5).unwrap();
                profiles.record_loss(MEMBER);
            }
        }

        dispatcher.handle(&create_message(MEMBER, "!guessflag")).await;

        let replies = replies.lock().unwrap();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains("maximum of 5 attempts"));
    }
}
