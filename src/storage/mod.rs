// drivedump/src/storage/mod.rs
pub(crate) mod drive;

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use serde::Deserialize;
use std::path::Path;

use crate::errors::Result;

pub use drive::GoogleDrive;

pub const ARCHIVE_MIME_TYPE: &str = "application/zip";

/// A previously uploaded archive as reported by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteBackupRecord {
    pub id: String,
    pub name: String,
    pub created_time: DateTime<Utc>,
}

impl RemoteBackupRecord {
    /// Name plus creation time in the local timezone, used in selection lists.
    pub fn label(&self) -> String {
        format!(
            "{} ({})",
            self.name,
            self.created_time
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
        )
    }
}

/// Folder-based object store holding backup archives.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Newest first, at most `limit` records.
    async fn list(
        &self,
        folder_id: &str,
        name_prefix: &str,
        mime_type: &str,
        limit: usize,
    ) -> Result<Vec<RemoteBackupRecord>>;

    async fn upload(&self, local_path: &Path, folder_id: &str) -> Result<RemoteBackupRecord>;

    /// Streams the record's content into `destination`.
    async fn download(&self, record_id: &str, destination: &Path) -> Result<()>;
}
