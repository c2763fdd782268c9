//! Bot module wiring the chat network to the command pipeline.
//!
//! This module provides the main [`Bot`] implementation: it logs the Matrix account
//! in, loads the player profiles and runs the sync loop. Every inbound message is
//! published to the trivia answer stream and handled by the
//! [`Dispatcher`] in its own task.
//!
//! # Message Flow
//!
//! ```text
//!                         ┌─► answer stream (broadcast) ─► trivia rounds
//! Matrix Message ─► Bot ──┤
//!                         └─► Dispatcher (spawned task) ─► Parse → Check permission → Execute → Reply
//! ```
//!
//! # Example
//!
//! ```no_run
//! # use marshal::bot::Bot;
//! # use marshal::config::Config;
//! # async fn run() -> Result<(), anyhow::Error> {
//! let config = Config::load("config.yaml")?;
//!
//! // Create and start the bot
//! let bot = Bot::new(config, "./data").await?;
//! bot.start().await; // Runs indefinitely
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use log::{error, info};
use tokio::sync::{Mutex, broadcast};

use crate::{
    chat::InboundMessage,
    commands::Dispatcher,
    config::Config,
    matrix::{MatrixClient, UserCredentials},
    media::MediaVault,
    moderation::ModerationLedger,
    profiles::ProfileStore,
    trivia::{GameSettings, TriviaManager},
    utils::get_path,
};

/// Messages buffered for each trivia round before it starts lagging.
const ANSWER_STREAM_CAPACITY: usize = 64;

pub struct Bot {
    matrix_client: Arc<MatrixClient>,

    /// Publishes every inbound message to the running trivia rounds
    inbound: broadcast::Sender<InboundMessage>,

    dispatcher: Arc<Dispatcher<MatrixClient>>,
}

impl Bot {
    /// Logs in and builds every component of the bot.
    ///
    /// # Arguments
    ///
    /// * `config` - Loaded configuration
    /// * `data_path` - Directory holding `user-data.json` and `saved-media/`
    ///
    /// # Errors
    ///
    /// Returns an error if the Matrix login fails.
    pub async fn new(config: Config, data_path: &str) -> Result<Self, anyhow::Error> {
        // Create matrix client
        let matrix_client = Arc::new(
            MatrixClient::new(&UserCredentials {
                user_id: config.matrix.user_id,
                password: config.matrix.password,
            })
            .await?,
        );

        let profiles = Arc::new(Mutex::new(
            ProfileStore::load(get_path(data_path, "user-data.json")).await,
        ));

        let (inbound, _) = broadcast::channel(ANSWER_STREAM_CAPACITY);

        let trivia = TriviaManager::new(
            Arc::clone(&matrix_client),
            Arc::clone(&profiles),
            inbound.clone(),
            GameSettings::from(&config.game),
        );

        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&matrix_client),
            ModerationLedger::new(config.moderation.warning_threshold),
            profiles,
            trivia,
            MediaVault::new(get_path(data_path, "saved-media")),
        ));

        Ok(Bot {
            matrix_client,
            inbound,
            dispatcher,
        })
    }

    /// Runs the sync loop until it fails.
    pub async fn start(self) {
        let inbound = self.inbound.clone();
        let dispatcher = Arc::clone(&self.dispatcher);

        // Create message handler closure
        let on_message = move |message: InboundMessage| {
            // Only running rounds listen, having none is not an error
            let _ = inbound.send(message.clone());
            Self::handle_matrix_message(Arc::clone(&dispatcher), message);
        };

        // Start matrix sync
        if let Err(e) = self.matrix_client.sync(on_message).await {
            error!("{:#}", e);
        }

        info!("bot stopped");
    }

    fn handle_matrix_message(dispatcher: Arc<Dispatcher<MatrixClient>>, message: InboundMessage) {
        // A trivia round keeps its task busy until it resolves, other messages
        // must not wait for it
        tokio::spawn(async move {
            dispatcher.handle(&message).await;
        });
    }
}
