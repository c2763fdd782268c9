//! In-memory ledger of user warnings.
//!
//! This module provides the [`ModerationLedger`] which tracks warnings per user and
//! applies the removal threshold.

use std::collections::HashMap;

use log::{debug, info};

use crate::moderation::WarningRecord;

/// Result of warning a user.
#[derive(Debug, PartialEq, Eq)]
pub enum WarnOutcome {
    /// The user is still below the threshold. Holds the live record.
    Warned(WarningRecord),
    /// The user reached the threshold and must be removed from the room.
    ///
    /// Holds the record so the caller can report the final count. The record
    /// stays in the ledger until [`ModerationLedger::clear`] is called.
    ThresholdReached(WarningRecord),
}

/// Tracks warnings per user and decides when a user must be removed.
///
/// A user is present in the ledger iff they have at least one active warning.
/// Reaching `threshold` warnings requests the removal of the user. The record is
/// only dropped once the removal succeeded, so every further warning retries it.
///
/// # Examples
///
/// ```no_run
/// use marshal::moderation::{ModerationLedger, WarnOutcome};
///
/// let mut ledger = ModerationLedger::new(3);
/// ledger.warn("@spammer:example.com", "spam");
/// ledger.warn("@spammer:example.com", "more spam");
/// let outcome = ledger.warn("@spammer:example.com", "even more spam");
/// assert!(matches!(outcome, WarnOutcome::ThresholdReached(_)));
/// ```
#[derive(Debug)]
pub struct ModerationLedger {
    /// Warning records indexed by user id
    records: HashMap<String, WarningRecord>,
    /// Warning count that triggers removal
    threshold: u32,
}

impl ModerationLedger {
    /// Creates an empty ledger.
    ///
    /// # Arguments
    ///
    /// * `threshold` - Warning count at which a user is removed. A threshold of 0
    ///   is treated as 1.
    pub fn new(threshold: u32) -> Self {
        ModerationLedger {
            records: HashMap::new(),
            threshold: threshold.max(1),
        }
    }

    /// Adds a warning to `user_id` with the given reason.
    ///
    /// When the resulting count reaches the threshold
    /// [`WarnOutcome::ThresholdReached`] is returned: the caller is responsible
    /// for removing the user from the room, then for clearing the record.
    pub fn warn(&mut self, user_id: &str, reason: &str) -> WarnOutcome {
        let record = self.records.entry(user_id.to_owned()).or_default();
        record.count += 1;
        record.reasons.push(reason.to_owned());

        debug!("user {} has {} warning(s)", user_id, record.count);

        if record.count >= self.threshold {
            info!("user {} reached {} warnings", user_id, record.count);
            return WarnOutcome::ThresholdReached(record.clone());
        }

        WarnOutcome::Warned(record.clone())
    }

    /// Removes one warning from `user_id`.
    ///
    /// The record is dropped once its count reaches zero.
    ///
    /// # Returns
    ///
    /// The remaining warning count, 0 if the user has no record.
    pub fn unwarn(&mut self, user_id: &str) -> u32 {
        let Some(record) = self.records.get_mut(user_id) else {
            debug!("no warning to remove for {}", user_id);
            return 0;
        };

        record.count = record.count.saturating_sub(1);
        if record.count == 0 {
            self.records.remove(user_id);
            return 0;
        }

        record.count
    }

    /// Numbered reasons of the warnings of `user_id`.
    ///
    /// Returns `None` when the user has no warning.
    pub fn list(&self, user_id: &str) -> Option<Vec<String>> {
        self.records.get(user_id).map(|r| r.numbered_reasons())
    }

    /// Drops every warning of `user_id`.
    ///
    /// Called once the user has been removed from the room.
    pub fn clear(&mut self, user_id: &str) -> Option<WarningRecord> {
        self.records.remove(user_id)
    }

    /// Current record of `user_id`, if any.
    #[cfg(test)]
    pub fn get(&self, user_id: &str) -> Option<&WarningRecord> {
        self.records.get(user_id)
    }

    /// Number of users with at least one warning.
    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: &str = "@u1:example.com";

    #[test]
    fn test_warn_scenario_until_removal() {
        let mut ledger = ModerationLedger::new(3);

        let first = ledger.warn(USER, "spam");
        assert!(matches!(&first, WarnOutcome::Warned(r) if r.count == 1));

        let second = ledger.warn(USER, "spam2");
        assert!(matches!(&second, WarnOutcome::Warned(r) if r.count == 2));

        let third = ledger.warn(USER, "spam3");
        match third {
            WarnOutcome::ThresholdReached(record) => {
                assert_eq!(record.count, 3);
                assert_eq!(record.reasons, vec!["spam", "spam2", "spam3"]);
            }
            _ => panic!("Expected ThresholdReached"),
        }

        // Kept until the removal is confirmed
        assert_eq!(ledger.get(USER).map(|r| r.count), Some(3));
        ledger.clear(USER);
        assert_eq!(ledger.len(), 0);
    }

    #[test]
    fn test_count_is_min_of_calls_and_threshold() {
        for calls in 1..=2u32 {
            let mut ledger = ModerationLedger::new(3);
            let mut removals = 0;
            for i in 0..calls {
                if let WarnOutcome::ThresholdReached(_) = ledger.warn(USER, &format!("r{i}")) {
                    removals += 1;
                }
            }
            assert_eq!(removals, 0);
            assert_eq!(ledger.get(USER).map(|r| r.count), Some(calls));
        }
    }

    #[test]
    fn test_removal_fires_once_then_fresh_record() {
        let mut ledger = ModerationLedger::new(3);
        let mut removals = 0;

        for i in 0..4 {
            if let WarnOutcome::ThresholdReached(_) = ledger.warn(USER, &format!("r{i}")) {
                removals += 1;
                ledger.clear(USER);
            }
        }

        assert_eq!(removals, 1);
        // The fourth warning started a new record
        let record = ledger.get(USER).unwrap();
        assert_eq!(record.count, 1);
        assert_eq!(record.reasons, vec!["r3"]);
    }

    #[test]
    fn test_unconfirmed_removal_is_requested_again() {
        let mut ledger = ModerationLedger::new(3);
        for i in 0..3 {
            ledger.warn(USER, &format!("r{i}"));
        }

        match ledger.warn(USER, "r3") {
            WarnOutcome::ThresholdReached(record) => assert_eq!(record.count, 4),
            _ => panic!("Expected ThresholdReached"),
        }
    }

    #[test]
    fn test_unwarn_last_warning_drops_record() {
        let mut ledger = ModerationLedger::new(3);
        ledger.warn(USER, "spam");

        assert_eq!(ledger.unwarn(USER), 0);
        assert!(ledger.get(USER).is_none());
        assert!(ledger.list(USER).is_none());
    }

    #[test]
    fn test_unwarn_absent_user() {
        let mut ledger = ModerationLedger::new(3);

        assert_eq!(ledger.unwarn(USER), 0);
        assert_eq!(ledger.len(), 0);
    }

    #[test]
    fn test_unwarn_keeps_reasons() {
        let mut ledger = ModerationLedger::new(3);
        ledger.warn(USER, "spam");
        ledger.warn(USER, "flood");

        assert_eq!(ledger.unwarn(USER), 1);
        assert_eq!(
            ledger.list(USER),
            Some(vec!["1. spam".to_string(), "2. flood".to_string()])
        );
    }

    #[test]
    fn test_list_is_per_user() {
        let mut ledger = ModerationLedger::new(3);
        ledger.warn(USER, "spam");

        assert!(ledger.list("@other:example.com").is_none());
    }

    #[test]
    fn test_clear() {
        let mut ledger = ModerationLedger::new(3);
        ledger.warn(USER, "spam");

        assert_eq!(ledger.clear(USER).map(|r| r.count), Some(1));
        assert!(ledger.clear(USER).is_none());
    }

    #[test]
    fn test_threshold_of_one() {
        let mut ledger = ModerationLedger::new(0);

        assert!(matches!(
            ledger.warn(USER, "spam"),
            WarnOutcome::ThresholdReached(r) if r.count == 1
        ));
    }
}
