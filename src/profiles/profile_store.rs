//! Profile store with daily quota bookkeeping and JSON persistence.
//!
//! This module provides the [`ProfileStore`] which owns every [`UserProfile`] and
//! writes them to disk as one JSON document.

use std::{collections::HashMap, fmt};

use chrono::NaiveDate;
use log::{debug, error, info, warn};
use tokio::fs;

use crate::profiles::UserProfile;

/// A user tried to start a round after using all of today's attempts.
#[derive(Debug, PartialEq, Eq)]
pub struct QuotaExceeded {
    /// Number of attempts allowed per day
    pub quota: u32,
}

impl fmt::Display for QuotaExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "daily quota of {} attempts reached", self.quota)
    }
}

impl std::error::Error for QuotaExceeded {}

/// Owns the trivia profiles and persists them.
///
/// Profiles are created lazily on the first round a user starts and are never
/// deleted. The whole map is rewritten on every [`ProfileStore::persist`], so a
/// crash between a change and the next persist loses that change.
///
/// # Examples
///
/// ```no_run
/// use marshal::profiles::ProfileStore;
///
/// # async fn example() {
/// let mut store = ProfileStore::load("user-data.json".to_string()).await;
/// let today = chrono::Utc::now().date_naive();
///
/// if store.try_start("@alice:example.com", today, 5).is_ok() {
///     store.record_win("@alice:example.com", 10);
///     store.persist().await;
/// }
/// # }
/// ```
#[derive(Debug)]
pub struct ProfileStore {
    /// Path to the JSON document
    path: String,
    /// Profiles indexed by user id
    profiles: HashMap<String, UserProfile>,
}

impl ProfileStore {
    /// Loads the profiles from `path`.
    ///
    /// A missing or unreadable document yields an empty store, so the bot can
    /// always start.
    pub async fn load(path: String) -> Self {
        let profiles = match fs::read_to_string(&path).await {
            Err(_) => {
                warn!("no persisted profiles found at {}, starting empty", path);
                HashMap::new()
            }
            Ok(serialized) => match serde_json::from_str(&serialized) {
                Ok(profiles) => profiles,
                Err(e) => {
                    error!("failed to deserialize profiles ({}), starting empty", e);
                    HashMap::new()
                }
            },
        };

        info!("loaded {} profile(s)", profiles.len());

        ProfileStore { path, profiles }
    }

    /// Registers the start of a round for `user_id` on `today`.
    ///
    /// Creates the profile if needed and resets the daily counter when the day
    /// changed. The counter itself is only incremented once the round resolves.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaExceeded`] when the user already played `quota` rounds today.
    pub fn try_start(
        &mut self,
        user_id: &str,
        today: NaiveDate,
        quota: u32,
    ) -> Result<(), QuotaExceeded> {
        let profile = self.profiles.entry(user_id.to_owned()).or_default();
        profile.roll_over(today);

        if profile.games_played >= quota {
            debug!(
                "{} already played {} round(s) on {}",
                user_id, profile.games_played, today
            );
            return Err(QuotaExceeded { quota });
        }

        Ok(())
    }

    /// Credits a won round to `user_id`.
    ///
    /// # Returns
    ///
    /// The new balance.
    pub fn record_win(&mut self, user_id: &str, reward: u64) -> u64 {
        let profile = self.profiles.entry(user_id.to_owned()).or_default();
        profile.balance += reward;
        profile.games_played += 1;
        profile.balance
    }

    /// Counts a lost round against the daily quota of `user_id`.
    pub fn record_loss(&mut self, user_id: &str) {
        self.profiles
            .entry(user_id.to_owned())
            .or_default()
            .games_played += 1;
    }

    /// Profile of `user_id`, if any.
    #[cfg(test)]
    pub fn get(&self, user_id: &str) -> Option<&UserProfile> {
        self.profiles.get(user_id)
    }

    /// Number of known profiles.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Writes every profile to disk.
    ///
    /// Errors are logged and swallowed: failing to persist must not break a round.
    pub async fn persist(&self) {
        let serialized = match serde_json::to_string_pretty(&self.profiles) {
            Ok(serialized) => serialized,
            Err(e) => {
                error!("failed to serialize profiles: {}", e);
                return;
            }
        };

        if let Err(e) = fs::write(&self.path, serialized).await {
            error!("failed to persist profiles to {}: {}", self.path, e);
            return;
        }

        debug!("persisted {} profile(s)", self.profiles.len());
    }
}
