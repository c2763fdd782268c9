//! Player profiles of the trivia game.
//!
//! Profiles hold the points earned by each user and how many rounds they played
//! today. They are persisted as a single JSON document rewritten after every
//! resolved round.
//!
//! - [`UserProfile`]: balance and daily play counter of a user
//! - [`ProfileStore`]: profiles indexed by user id, with daily quota bookkeeping and
//!   persistence

mod profile;
mod profile_store;

pub use crate::profiles::{
    profile::UserProfile,
    profile_store::{ProfileStore, QuotaExceeded},
};
