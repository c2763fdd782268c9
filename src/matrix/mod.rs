//! Matrix implementation of the chat network.
//!
//! This module provides the [`MatrixClient`] which logs in, runs the sync loop and
//! implements [`ChatClient`](crate::chat::ChatClient) on top of `matrix-sdk`.
//!
//! # Architecture
//!
//! - **Login**: password login with an in-memory store via the login submodule
//! - **Sync**: auto-join of invites and delivery of new text messages via the sync
//!   submodule
//! - **Client**: replies, permissions, kicks and quoted media via the client submodule
//!
//! # Examples
//!
//! ```no_run
//! use marshal::matrix::{MatrixClient, UserCredentials};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let credentials = UserCredentials {
//!     user_id: "@marshal:example.com".to_string(),
//!     password: "password".to_string(),
//! };
//!
//! let client = MatrixClient::new(&credentials).await?;
//! client.sync(|message| println!("{}: {}", message.sender_id, message.body)).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod login;
mod sync;

pub use crate::matrix::client::MatrixClient;

/// User credentials for a Matrix account
#[derive(Debug, Clone)]
pub struct UserCredentials {
    /// User ID of the matrix account
    pub user_id: String,
    /// Password of the matrix account
    pub password: String,
}
