//! State of a single trivia round.

use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU8, Ordering},
    },
};

use log::warn;
use tokio::{sync::broadcast, time::Instant};

use crate::{chat::InboundMessage, trivia::Flag};

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RoundOutcome {
    Correct = 1,
    Incorrect = 2,
    Timeout = 3,
}

const PENDING: u8 = 0;

/// Single-resolution guard of a round.
///
/// Moves from pending to exactly one [`RoundOutcome`]. Every path that may end a
/// round must win [`RoundState::resolve`] before applying its side effects; the
/// losers become no-ops.
#[derive(Debug)]
pub struct RoundState(AtomicU8);

impl RoundState {
    pub fn new() -> Self {
        RoundState(AtomicU8::new(PENDING))
    }

    /// Tries to end the round with `outcome`.
    ///
    /// Returns `true` only for the first call.
    pub fn resolve(&self, outcome: RoundOutcome) -> bool {
        self.0
            .compare_exchange(PENDING, outcome as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// The outcome, `None` while pending.
    #[cfg(test)]
    pub fn outcome(&self) -> Option<RoundOutcome> {
        match self.0.load(Ordering::Acquire) {
            1 => Some(RoundOutcome::Correct),
            2 => Some(RoundOutcome::Incorrect),
            3 => Some(RoundOutcome::Timeout),
            _ => None,
        }
    }
}

impl Default for RoundState {
    fn default() -> Self {
        Self::new()
    }
}

/// Users with a round in progress.
pub(crate) type OpenRounds = Arc<Mutex<HashSet<String>>>;

/// Claim of a user on their single open round.
///
/// The user is released when the slot is dropped.
#[derive(Debug)]
pub(crate) struct PlayerSlot {
    open_rounds: OpenRounds,
    user_id: String,
}

impl PlayerSlot {
    /// Claims a slot for `user_id`, `None` if the user already holds one.
    pub(crate) fn claim(open_rounds: &OpenRounds, user_id: &str) -> Option<Self> {
        let claimed = open_rounds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id.to_owned());

        claimed.then(|| PlayerSlot {
            open_rounds: Arc::clone(open_rounds),
            user_id: user_id.to_owned(),
        })
    }
}

impl Drop for PlayerSlot {
    fn drop(&mut self) {
        self.open_rounds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.user_id);
    }
}

/// A started round waiting for its answer.
///
/// The round owns its subscription to the inbound message stream: dropping the
/// round unsubscribes and frees the initiator's slot, whichever way it ended.
#[derive(Debug)]
pub struct Round {
    /// Flag to guess
    pub(crate) flag: &'static Flag,
    /// Command message that started the round
    pub(crate) origin: InboundMessage,
    /// Subscription to the inbound message stream
    pub(crate) answers: broadcast::Receiver<InboundMessage>,
    /// Instant after which the round times out
    pub(crate) deadline: Instant,
    /// Resolution guard
    pub(crate) state: RoundState,
    /// Claim of the initiator, one open round per user
    pub(crate) slot: PlayerSlot,
}

impl Round {
    /// Flag the user has to guess.
    #[cfg(test)]
    pub fn flag(&self) -> &'static Flag {
        self.flag
    }

    /// Whether `message` is an answer to this round.
    ///
    /// Only messages of the initiator in the room of the round count.
    pub fn is_answer(&self, message: &InboundMessage) -> bool {
        message.sender_id == self.origin.sender_id
            && message.room_id == self.origin.room_id
            && message.event_id != self.origin.event_id
    }

    /// Waits for the next answer.
    ///
    /// Returns `None` once the inbound stream is closed.
    pub(crate) async fn next_answer(&mut self) -> Option<InboundMessage> {
        loop {
            match self.answers.recv().await {
                Ok(message) if self.is_answer(&message) => return Some(message),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("trivia round lagged behind by {} message(s)", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
