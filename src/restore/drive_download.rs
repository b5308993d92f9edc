// drivedump/src/restore/drive_download.rs
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::errors::Result;
use crate::storage::drive::{ensure_success, GoogleDrive, FILES_URL};

/// Downloads the content of a Drive file to `destination_path`.
///
/// The body is written chunk by chunk and flushed before returning.
pub async fn download_file_from_drive(
    drive: &GoogleDrive,
    file_id: &str,
    destination_path: &Path,
) -> Result<()> {
    println!(
        "Downloading Drive file {} to {}",
        file_id,
        destination_path.display()
    );

    if let Some(parent_dir) = destination_path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            tokio::fs::create_dir_all(parent_dir).await?;
        }
    }

    let token = drive.access_token().await?;
    let response = drive
        .http()
        .get(format!("{}/{}", FILES_URL, file_id))
        .bearer_auth(&token)
        .query(&[("alt", "media"), ("supportsAllDrives", "true")])
        .send()
        .await?;
    let mut response = ensure_success(response, "file download").await?;

    let mut output_file = File::create(destination_path).await?;
    let mut total_bytes_downloaded = 0usize;
    while let Some(bytes_chunk) = response.chunk().await? {
        output_file.write_all(&bytes_chunk).await?;
        total_bytes_downloaded += bytes_chunk.len();
    }
    output_file.flush().await?;
    output_file.sync_all().await?;

    tracing::info!(id = %file_id, bytes = total_bytes_downloaded, "archive downloaded");
    println!(
        "✅ Downloaded {} bytes to {}",
        total_bytes_downloaded,
        destination_path.display()
    );
    Ok(())
}
