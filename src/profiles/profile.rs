//! Profile of a single player.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Last day a user started a round.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastPlayed {
    /// Calendar date, absent until the first round
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Trivia profile of a user.
///
/// `games_played` always counts rounds played on `last_played.date`: it is reset
/// before anything else when a round is started on another day.
///
/// Serialized as `{"balance": 10, "lastPlayed": {"date": "2024-05-01"}, "gamesPlayed": 1}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Points earned with correct answers
    #[serde(default)]
    pub balance: u64,
    /// Day the daily counter refers to
    #[serde(default)]
    pub last_played: LastPlayed,
    /// Rounds played on `last_played.date`
    #[serde(default)]
    pub games_played: u32,
}

impl UserProfile {
    /// Moves the daily counter to `today`, resetting it when the day changed.
    pub fn roll_over(&mut self, today: NaiveDate) {
        if self.last_played.date != Some(today) {
            self.last_played.date = Some(today);
            self.games_played = 0;
        }
    }
}
