//! Small helpers shared across the bot.

use std::{path::PathBuf, time::Duration};

/// Joins a file or directory name to a directory path.
///
/// # Examples
///
/// ```
/// # use marshal::utils::get_path;
/// let path = get_path("./data", "user-data.json");
/// assert_eq!(path, "./data/user-data.json");
/// ```
pub fn get_path(dir_path: &str, name: &str) -> String {
    let path_buf: PathBuf = [dir_path, name].iter().collect();
    path_buf.to_string_lossy().into_owned()
}

/// Formats a duration as `<h>h <m>m <s>s`.
///
/// Hours are not wrapped into days.
pub fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}
