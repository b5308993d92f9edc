// drivedump/src/backup/drive_upload.rs
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use serde::Serialize;
use std::path::Path;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::errors::{AppError, Result};
use crate::storage::drive::{ensure_success, GoogleDrive, RECORD_FIELDS, UPLOAD_URL};
use crate::storage::{RemoteBackupRecord, ARCHIVE_MIME_TYPE};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileMetadata<'a> {
    name: &'a str,
    parents: [&'a str; 1],
    mime_type: &'a str,
}

/// Uploads an archive into a Drive folder through a resumable upload session.
///
/// The session is opened with the file metadata, then the content is streamed
/// from disk in a single request.
pub async fn upload_file_to_drive(
    drive: &GoogleDrive,
    file_path: &Path,
    folder_id: &str,
) -> Result<RemoteBackupRecord> {
    let file_name = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::Remote(format!("invalid upload file name: {}", file_path.display())))?;
    let file_len = tokio::fs::metadata(file_path).await?.len();

    println!(
        "Uploading {} ({} bytes) to Drive folder {}",
        file_path.display(),
        file_len,
        folder_id
    );

    let token = drive.access_token().await?;
    let metadata = FileMetadata {
        name: file_name,
        parents: [folder_id],
        mime_type: ARCHIVE_MIME_TYPE,
    };

    let session = drive
        .http()
        .post(UPLOAD_URL)
        .bearer_auth(&token)
        .query(&[
            ("uploadType", "resumable"),
            ("supportsAllDrives", "true"),
            ("fields", RECORD_FIELDS),
        ])
        .header("X-Upload-Content-Type", ARCHIVE_MIME_TYPE)
        .header("X-Upload-Content-Length", file_len)
        .json(&metadata)
        .send()
        .await?;
    let session = ensure_success(session, "upload session").await?;
    let upload_url = session
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Remote("upload session response has no Location header".to_string()))?
        .to_string();

    let file = File::open(file_path).await?;
    let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

    let response = drive
        .http()
        .put(&upload_url)
        .bearer_auth(&token)
        .header(CONTENT_TYPE, ARCHIVE_MIME_TYPE)
        .header(CONTENT_LENGTH, file_len)
        .body(body)
        .send()
        .await?;
    let response = ensure_success(response, "file upload").await?;
    let record: RemoteBackupRecord = response.json().await?;

    tracing::info!(id = %record.id, name = %record.name, bytes = file_len, "archive uploaded");
    println!("✅ Uploaded {} as Drive file {}", record.name, record.id);
    Ok(record)
}
