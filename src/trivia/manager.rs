//! Trivia session manager.
//!
//! This module provides the [`TriviaManager`] which starts rounds, waits for the
//! answer or the deadline and applies the outcome to the player's profile.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use log::{debug, info};
use tokio::{
    sync::{Mutex, broadcast},
    time::{self, Instant},
};

use crate::{
    chat::{ChatClient, InboundMessage},
    commands::markdown_response::{
        format_correct_answer, format_incorrect_answer, format_quota_exceeded,
        format_round_in_progress, format_round_prompt, format_round_timeout,
    },
    profiles::ProfileStore,
    trivia::{Flag, OpenRounds, PlayerSlot, Round, RoundOutcome, RoundState},
};

/// Tunable parameters of the game.
#[derive(Debug, Clone)]
pub struct GameSettings {
    /// Rounds a user may play per calendar day
    pub daily_quota: u32,
    /// Time given to answer
    pub round_duration: Duration,
    /// Points credited for a correct answer
    pub reward: u64,
}

impl Default for GameSettings {
    fn default() -> Self {
        GameSettings {
            daily_quota: 5,
            round_duration: Duration::from_secs(30),
            reward: 10,
        }
    }
}

/// Runs trivia rounds.
///
/// Each round subscribes to the inbound message stream for its lifetime only.
/// The number of subscribers of that stream is therefore the number of rounds
/// in progress, see [`TriviaManager::active_rounds`]. A user has at most one
/// round in progress, so the daily quota holds even when rounds overlap.
///
/// # Examples
///
/// ```no_run
/// # use marshal::trivia::TriviaManager;
/// # async fn example(manager: TriviaManager<impl marshal::chat::ChatClient>, message: marshal::chat::InboundMessage) -> anyhow::Result<()> {
/// if let Some(round) = manager.begin(&message).await? {
///     let outcome = manager.finish(round).await?;
///     println!("round ended: {:?}", outcome);
/// }
/// # Ok(())
/// # }
/// ```
pub struct TriviaManager<C: ChatClient> {
    /// Client used to talk to the players
    client: Arc<C>,
    /// Player profiles, shared with the dispatcher
    profiles: Arc<Mutex<ProfileStore>>,
    /// Inbound message stream, rounds subscribe to it to receive answers
    inbound: broadcast::Sender<InboundMessage>,
    /// Game parameters
    settings: GameSettings,
    /// Users with a round in progress
    open_rounds: OpenRounds,
}

impl<C: ChatClient> TriviaManager<C> {
    pub fn new(
        client: Arc<C>,
        profiles: Arc<Mutex<ProfileStore>>,
        inbound: broadcast::Sender<InboundMessage>,
        settings: GameSettings,
    ) -> Self {
        TriviaManager {
            client,
            profiles,
            inbound,
            settings,
            open_rounds: OpenRounds::default(),
        }
    }

    /// Number of rounds currently waiting for an answer.
    pub fn active_rounds(&self) -> usize {
        self.inbound.receiver_count()
    }

    /// Plays a full round started by `origin`.
    ///
    /// # Returns
    ///
    /// - `Ok(None)`: the user used all of today's attempts or already has a round
    ///   in progress, no round was started
    /// - `Ok(Some(outcome))`: how the round ended
    pub async fn play(&self, origin: &InboundMessage) -> anyhow::Result<Option<RoundOutcome>> {
        let Some(round) = self.begin(origin).await? else {
            return Ok(None);
        };

        Ok(Some(self.finish(round).await?))
    }

    /// Starts a round for the sender of `origin`.
    ///
    /// Checks that the user has no round in progress and the daily quota, picks a
    /// flag, subscribes to the inbound stream and sends the prompt. When either
    /// check fails the user is told so and no round is started.
    ///
    /// # Errors
    ///
    /// Returns an error if a reply cannot be sent. The subscription is released
    /// in that case.
    pub async fn begin(&self, origin: &InboundMessage) -> anyhow::Result<Option<Round>> {
        let Some(slot) = PlayerSlot::claim(&self.open_rounds, &origin.sender_id) else {
            info!("{} already has a round in progress", origin.sender_id);
            self.client
                .reply(origin, &format_round_in_progress())
                .await?;
            return Ok(None);
        };

        let today = Utc::now().date_naive();
        let quota_check = self.profiles.lock().await.try_start(
            &origin.sender_id,
            today,
            self.settings.daily_quota,
        );

        if let Err(e) = quota_check {
            info!("{} cannot start a round: {}", origin.sender_id, e);
            self.client
                .reply(origin, &format_quota_exceeded(e.quota))
                .await?;
            return Ok(None);
        }

        let flag = Flag::random();
        // Subscribe before the prompt goes out so no answer can be missed
        let answers = self.inbound.subscribe();

        self.client
            .reply(
                origin,
                &format_round_prompt(flag.symbol, self.settings.round_duration.as_secs()),
            )
            .await?;

        info!(
            "trivia round started by {} in {}",
            origin.sender_id, origin.room_id
        );
        debug!("expected answer: {}", flag.country);

        Ok(Some(Round {
            flag,
            origin: origin.clone(),
            answers,
            deadline: Instant::now() + self.settings.round_duration,
            state: RoundState::new(),
            slot,
        }))
    }

    /// Waits for the end of `round` and applies its outcome.
    ///
    /// The first answer of the initiator before the deadline wins or loses the
    /// round, otherwise it times out. Exactly one closing reply is sent and the
    /// subscription is released before any side effect.
    ///
    /// - Correct: reward credited, attempt counted, profiles persisted
    /// - Incorrect: attempt counted, profiles persisted
    /// - Timeout: nothing changes
    pub async fn finish(&self, mut round: Round) -> anyhow::Result<RoundOutcome> {
        let deadline = round.deadline;

        let answer = tokio::select! {
            answer = async {
                match round.next_answer().await {
                    Some(answer) => answer,
                    // Stream closed, only the deadline can end the round
                    None => std::future::pending().await,
                }
            } => Some(answer),
            _ = time::sleep_until(deadline) => None,
        };

        let Round {
            flag,
            origin,
            answers,
            state,
            slot,
            ..
        } = round;
        drop(answers);

        let outcome = match &answer {
            Some(answer) if flag.matches(&answer.body) => RoundOutcome::Correct,
            Some(_) => RoundOutcome::Incorrect,
            None => RoundOutcome::Timeout,
        };

        // `select!` picked a single winner, so this is the only resolution
        let resolved = state.resolve(outcome);
        debug_assert!(resolved);

        info!("trivia round of {} ended: {:?}", origin.sender_id, outcome);

        match (outcome, answer) {
            (RoundOutcome::Correct, Some(answer)) => {
                let balance = {
                    let mut profiles = self.profiles.lock().await;
                    let balance = profiles.record_win(&origin.sender_id, self.settings.reward);
                    profiles.persist().await;
                    balance
                };
                self.client
                    .reply(
                        &answer,
                        &format_correct_answer(flag.country, self.settings.reward, balance),
                    )
                    .await?;
            }
            (RoundOutcome::Incorrect, Some(answer)) => {
                {
                    let mut profiles = self.profiles.lock().await;
                    profiles.record_loss(&origin.sender_id);
                    profiles.persist().await;
                }
                self.client
                    .reply(&answer, &format_incorrect_answer(flag.country))
                    .await?;
            }
            _ => {
                self.client.reply(&origin, &format_round_timeout()).await?;
            }
        }

        // The user may start a new round once this one is fully applied
        drop(slot);
        Ok(outcome)
    }
}
