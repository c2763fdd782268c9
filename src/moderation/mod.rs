//! Room moderation through escalating warnings.
//!
//! Moderators warn users with a reason. Warnings accumulate per user in the
//! [`ModerationLedger`]; once a user reaches the warning threshold the ledger
//! forgets them and asks the caller to remove them from the room.
//!
//! - [`WarningRecord`]: warning count and reasons of a single user
//! - [`ModerationLedger`]: per-user records and the threshold policy
//!
//! The ledger lives in memory only, warnings do not survive a restart.

mod ledger;
mod warning;

pub use crate::moderation::{
    ledger::{ModerationLedger, WarnOutcome},
    warning::WarningRecord,
};
