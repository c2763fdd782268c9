//! Markdown response formatters.
//!
//! Every text the bot sends lives here so the wording stays consistent between
//! commands and the trivia game.

/// Formats the help message.
///
/// The admin section is only listed for users with elevated permission.
///
/// # Examples
///
/// ```
/// # use marshal::commands::markdown_response::format_help;
/// assert!(!format_help(false).contains("Admin Commands"));
/// assert!(format_help(true).contains("Admin Commands"));
/// ```
pub fn format_help(elevated: bool) -> String {
    let mut body = "**Available Commands:**\n\n\
        📋 **General Commands:**\n\
        - `!guessflag`: start a flag guessing game, then type the country's name\n\
        - `!ping`: check bot responsiveness\n\
        - `!botinfo`: get bot uptime\n\
        - `!status`: check bot status\n\
        - `!get`: reply to a view-once media to retrieve it\n\
        - `!help`: show this help message\n"
        .to_owned();

    if elevated {
        body.push_str(
            "\n🛠️ **Admin Commands:**\n\
            - `!warn <user> <reason>`: warn a user (3 warnings = kick)\n\
            - `!listwarn <user>`: list warnings of a user\n\
            - `!delwarn <user>`: remove a warning of a user\n\
            - `!kick <user>`: remove a user from the room\n",
        );
    }

    body
}

pub fn format_unknown_command(name: &str) -> String {
    format!("Unknown command `!{}`. Type `!help` for more information.", name)
}

pub fn format_permission_denied() -> String {
    "You don't have permission to use this command.".to_owned()
}

pub fn format_invalid_warn() -> String {
    "Invalid warn command. Usage: `!warn <user> <reason>`".to_owned()
}

pub fn format_invalid_delwarn() -> String {
    "Invalid delwarn command. Usage: `!delwarn <user>`".to_owned()
}

pub fn format_invalid_listwarn() -> String {
    "Invalid listwarn command. Usage: `!listwarn <user>`".to_owned()
}

pub fn format_invalid_kick() -> String {
    "Invalid kick command. Usage: `!kick <user>`".to_owned()
}

pub fn format_pong() -> String {
    "Pong! The bot is online.".to_owned()
}

/// Formats the uptime report.
pub fn format_bot_info(uptime: &str) -> String {
    format!("Bot uptime: {}", uptime)
}

/// Formats the status report.
///
/// # Arguments
///
/// * `uptime` - Formatted uptime
/// * `warned_users` - Users with at least one active warning
/// * `profiles` - Known trivia profiles
/// * `active_rounds` - Trivia rounds waiting for an answer
pub fn format_status(
    uptime: &str,
    warned_users: usize,
    profiles: usize,
    active_rounds: usize,
) -> String {
    format!(
        "Bot status: online\n\
        - **uptime**: {}\n\
        - **warned users**: {}\n\
        - **player profiles**: {}\n\
        - **active rounds**: {}",
        uptime, warned_users, profiles, active_rounds
    )
}

pub fn format_warned(target: &str, count: u32) -> String {
    format!("User {} warned. Total warnings: {}", target, count)
}

/// Formats the reply sent when a warning reaches the removal threshold.
pub fn format_warned_and_removed(target: &str, count: u32) -> String {
    format!(
        "User {} warned. Total warnings: {}. Warning limit reached, the user has been removed.",
        target, count
    )
}

pub fn format_warning_removed(target: &str, count: u32) -> String {
    format!(
        "Removed a warning for {}. Total warnings: {}",
        target, count
    )
}

/// Formats the warnings of a user.
///
/// # Arguments
///
/// * `target` - User the warnings belong to
/// * `reasons` - Numbered reasons, `None` if the user has no warning
pub fn format_warning_list(target: &str, reasons: Option<&[String]>) -> String {
    let list = match reasons {
        Some(reasons) if !reasons.is_empty() => reasons.join("\n"),
        _ => "No warnings for this user.".to_owned(),
    };

    format!("Warnings for {}:\n{}", target, list)
}

pub fn format_kicked(target: &str) -> String {
    format!("User {} has been removed.", target)
}

pub fn format_get_usage() -> String {
    "Reply to a view-once media with `!get` to retrieve it.".to_owned()
}

pub fn format_not_view_once() -> String {
    "The quoted message is not a view-once media.".to_owned()
}

pub fn format_media_unavailable() -> String {
    "Sorry, I couldn't retrieve the media.".to_owned()
}

pub fn format_generic_error() -> String {
    "An error occurred while processing your request.".to_owned()
}

pub fn format_quota_exceeded(quota: u32) -> String {
    format!(
        "You have reached the maximum of {} attempts for the flag guessing game today. Try again tomorrow!",
        quota
    )
}

pub fn format_round_in_progress() -> String {
    "You already have a flag to guess. Answer it before starting a new round.".to_owned()
}

/// Formats the prompt of a trivia round.
pub fn format_round_prompt(flag: &str, seconds: u64) -> String {
    format!(
        "Guess the country for this flag: {}\n\nType the country's name directly in this chat. You have {} seconds to respond.",
        flag, seconds
    )
}

pub fn format_correct_answer(country: &str, reward: u64, balance: u64) -> String {
    format!(
        "Correct! The country is {}. You've earned {} points. Your balance is now {} points.",
        country, reward, balance
    )
}

pub fn format_incorrect_answer(country: &str) -> String {
    format!("Incorrect! The correct answer was {}.", country)
}

pub fn format_round_timeout() -> String {
    "Time's up! You didn't answer in time. The game has ended.".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_help_general_only() {
        let help = format_help(false);

        assert!(help.contains("`!guessflag`"));
        assert!(help.contains("`!status`"));
        assert!(!help.contains("`!warn"));
        assert!(!help.contains("`!kick"));
    }

    #[test]
    fn test_format_help_with_admin_section() {
        let help = format_help(true);

        assert!(help.contains("`!guessflag`"));
        assert!(help.contains("`!warn <user> <reason>`"));
        assert!(help.contains("`!delwarn <user>`"));
        assert!(help.contains("`!listwarn <user>`"));
        assert!(help.contains("`!kick <user>`"));
    }

    #[test]
    fn test_format_warning_list() {
        let reasons = vec!["1. spam".to_string(), "2. flood".to_string()];

        assert_eq!(
            format_warning_list("@bob:example.com", Some(&reasons)),
            "Warnings for @bob:example.com:\n1. spam\n2. flood"
        );
    }

    #[test]
    fn test_format_warning_list_empty() {
        assert_eq!(
            format_warning_list("@bob:example.com", None),
            "Warnings for @bob:example.com:\nNo warnings for this user."
        );
    }

    #[test]
    fn test_format_warned_and_removed_reports_count() {
        let message = format_warned_and_removed("@bob:example.com", 3);

        assert!(message.contains("Total warnings: 3"));
        assert!(message.contains("removed"));
    }

    #[test]
    fn test_format_round_prompt() {
        let prompt = format_round_prompt("🇯🇵", 30);

        assert!(prompt.contains("🇯🇵"));
        assert!(prompt.contains("30 seconds"));
    }

    #[test]
    fn test_format_status() {
        let status = format_status("1h 2m 3s", 2, 5, 1);

        assert!(status.contains("1h 2m 3s"));
        assert!(status.contains("**warned users**: 2"));
        assert!(status.contains("**player profiles**: 5"));
        assert!(status.contains("**active rounds**: 1"));
    }
}
