//! View-once media retrieval handler.
//!
//! `!get` must reply to a message flagged as view-once. The media is downloaded,
//! saved to the [`MediaVault`] and posted back as a reply to the command.
//!
//! # Errors
//!
//! A missing quote, a quote that is not view-once and a failed download are all
//! answered with a text reply. Failing to save the file is only logged.

use log::{debug, error, warn};

use crate::{
    chat::{ChatClient, InboundMessage},
    commands::{
        CommandResult,
        markdown_response::{format_get_usage, format_media_unavailable, format_not_view_once},
    },
    media::MediaVault,
};

/// Retrieves the view-once media quoted by `origin`.
///
/// # Returns
///
/// * `Ok(Some(CommandResult))` - A text reply explaining why nothing was retrieved
/// * `Ok(None)` - The media was posted back, nothing else to send
///
/// # Errors
///
/// Returns an error if the quoted message cannot be resolved or the media reply
/// cannot be sent.
pub async fn handle_get<C: ChatClient>(
    client: &C,
    vault: &MediaVault,
    origin: &InboundMessage,
) -> anyhow::Result<Option<CommandResult>> {
    debug!("handling get command");

    if origin.in_reply_to.is_none() {
        return Ok(Some(CommandResult::reply(format_get_usage())));
    }

    let Some(quoted) = client.quoted_message(origin).await? else {
        return Ok(Some(CommandResult::reply(format_get_usage())));
    };

    if !quoted.view_once {
        return Ok(Some(CommandResult::reply(format_not_view_once())));
    }

    let data = match client.download_media(&quoted).await {
        Ok(Some(data)) => data,
        Ok(None) => {
            warn!("quoted message {} carries no media", quoted.event_id);
            return Ok(Some(CommandResult::reply(format_media_unavailable())));
        }
        Err(e) => {
            error!("failed to download media of {}: {:#}", quoted.event_id, e);
            return Ok(Some(CommandResult::reply(format_media_unavailable())));
        }
    };

    if let Err(e) = vault.save(quoted.kind, &data).await {
        error!("failed to save media of {}: {:#}", quoted.event_id, e);
    }

    client.reply_with_media(origin, &quoted).await?;

    Ok(None)
}
