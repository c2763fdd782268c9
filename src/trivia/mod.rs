//! Flag guessing game.
//!
//! A round shows a random flag to the user who started it and waits for their
//! answer. The first message of that user wins the round or loses it; without an
//! answer the round times out.
//!
//! # Round lifecycle
//!
//! ```text
//! !guessflag ─► quota check ─► Announced ─► AwaitingAnswer ─┬─► Correct
//!                   │                                       ├─► Incorrect
//!                   └─► quota reply                         └─► Timeout
//! ```
//!
//! - [`flags`]: reference set of countries and their flags
//! - [`round`]: state of a single round and its single-resolution guard
//! - [`manager`]: starts rounds, races the answer against the deadline and
//!   credits profiles

mod flags;
mod manager;
mod round;

pub use crate::trivia::{
    flags::{FLAGS, Flag},
    manager::{GameSettings, TriviaManager},
    round::{Round, RoundOutcome, RoundState},
};
pub(crate) use crate::trivia::round::{OpenRounds, PlayerSlot};
