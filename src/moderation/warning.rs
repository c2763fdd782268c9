//! Warning record of a single user.

/// Warnings accumulated by a user.
///
/// A record only exists in the ledger while `count` is positive. Reasons are
/// append-only: removing a warning decrements the count but keeps the history.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WarningRecord {
    /// Number of active warnings
    pub count: u32,
    /// Reasons given for each warning, oldest first
    pub reasons: Vec<String>,
}

impl WarningRecord {
    /// Numbered list of reasons, starting at 1.
    pub fn numbered_reasons(&self) -> Vec<String> {
        self.reasons
            .iter()
            .enumerate()
            .map(|(idx, reason)| format!("{}. {}", idx + 1, reason))
            .collect()
    }
}
