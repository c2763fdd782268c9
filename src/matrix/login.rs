//! Matrix account login.
//!
//! Every start is a fresh password login with an in-memory store: nothing about
//! the session is written to disk.

use log::{debug, info};
use matrix_sdk::{Client, ruma::OwnedUserId};

use crate::matrix::UserCredentials;

/// Display name of the bot device.
const DEVICE_DISPLAY_NAME: &str = "marshal bot";

/// Builds a client for the homeserver of `user_credentials` and logs in.
///
/// # Errors
///
/// Returns an error if the user id is malformed, the homeserver cannot be
/// discovered or the credentials are rejected.
pub async fn login(user_credentials: &UserCredentials) -> Result<Client, anyhow::Error> {
    info!("logging in as {}", user_credentials.user_id);

    let user_id: OwnedUserId = user_credentials.user_id.clone().try_into()?;
    let client = Client::builder()
        .server_name(user_id.server_name())
        .build()
        .await?;

    debug!("matrix client created for {}", user_id.server_name());

    client
        .matrix_auth()
        .login_username(&user_id, &user_credentials.password)
        .initial_device_display_name(DEVICE_DISPLAY_NAME)
        .send()
        .await?;

    info!("logged in as {}", user_id);

    Ok(client)
}
