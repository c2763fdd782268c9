//! Local media storage.
//!
//! This module provides the [`MediaVault`] which writes retrieved media under a
//! directory with a generated timestamped filename.

use anyhow::Context;
use chrono::Utc;
use log::info;
use tokio::fs;

use crate::{chat::MediaKind, utils::get_path};

/// Directory where retrieved media are saved.
///
/// Files are named `media-<unix millis>.<ext>`, the extension comes from
/// [`MediaKind::extension`].
#[derive(Debug, Clone)]
pub struct MediaVault {
    /// Directory holding the saved files
    dir: String,
}

impl MediaVault {
    pub fn new(dir: String) -> Self {
        MediaVault { dir }
    }

    /// Writes `data` to a new file of the vault.
    ///
    /// The directory is created on first use.
    ///
    /// # Returns
    ///
    /// The path of the written file.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file written.
    pub async fn save(&self, kind: MediaKind, data: &[u8]) -> anyhow::Result<String> {
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create media directory {}", self.dir))?;

        let path = get_path(&self.dir, &Self::file_name(kind, Utc::now().timestamp_millis()));
        fs::write(&path, data)
            .await
            .with_context(|| format!("failed to write media to {}", path))?;

        info!("saved {} byte(s) of media to {}", data.len(), path);

        Ok(path)
    }

    fn file_name(kind: MediaKind, timestamp_millis: i64) -> String {
        format!("media-{}.{}", timestamp_millis, kind.extension())
    }
}
