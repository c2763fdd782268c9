//! Moderation command handlers.
//!
//! Handlers for `!warn`, `!delwarn`, `!listwarn` and `!kick`. They update the
//! [`ModerationLedger`] and return the removal to perform, if any. The caller
//! checks the sender's permission beforehand and clears the warnings of a
//! removed user once the removal succeeded.

use log::{debug, info};

use crate::{
    commands::{
        CommandResult,
        markdown_response::{
            format_kicked, format_warned, format_warned_and_removed, format_warning_list,
            format_warning_removed,
        },
    },
    moderation::{ModerationLedger, WarnOutcome},
};

pub fn handle_warn(ledger: &mut ModerationLedger, target: &str, reason: &str) -> CommandResult {
    debug!("handling warn command for {}", target);

    match ledger.warn(target, reason) {
        WarnOutcome::Warned(record) => CommandResult::reply(format_warned(target, record.count)),
        WarnOutcome::ThresholdReached(record) => {
            info!("{} reached {} warnings, requesting removal", target, record.count);
            CommandResult {
                response: format_warned_and_removed(target, record.count),
                participant_to_remove: Some((
                    target.to_owned(),
                    format!("Reached {} warnings", record.count),
                )),
            }
        }
    }
}

pub fn handle_delwarn(ledger: &mut ModerationLedger, target: &str) -> CommandResult {
    debug!("handling delwarn command for {}", target);

    let count = ledger.unwarn(target);
    CommandResult::reply(format_warning_removed(target, count))
}

pub fn handle_listwarn(ledger: &ModerationLedger, target: &str) -> CommandResult {
    debug!("handling listwarn command for {}", target);

    let reasons = ledger.list(target);
    CommandResult::reply(format_warning_list(target, reasons.as_deref()))
}

/// Removes `target` right away.
pub fn handle_kick(target: &str, sender_id: &str) -> CommandResult {
    debug!("handling kick command for {}", target);

    CommandResult {
        response: format_kicked(target),
        participant_to_remove: Some((target.to_owned(), format!("Removed by {}", sender_id))),
    }
}
