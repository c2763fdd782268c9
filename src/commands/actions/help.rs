use log::debug;

use crate::commands::{CommandResult, markdown_response::format_help};

pub fn handle_help(elevated: bool) -> CommandResult {
    debug!("handling help command, elevated: {}", elevated);

    CommandResult::reply(format_help(elevated))
}
