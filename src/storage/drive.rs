// drivedump/src/storage/drive.rs
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::{RemoteBackupRecord, RemoteStore};
use crate::backup::drive_upload::upload_file_to_drive;
use crate::config::DriveConfig;
use crate::errors::{AppError, Result};
use crate::restore::drive_download::download_file_from_drive;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";
pub(crate) const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
pub(crate) const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
pub(crate) const RECORD_FIELDS: &str = "id,name,createdTime";

const ASSERTION_LIFETIME_SECS: i64 = 3600;
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<RemoteBackupRecord>,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Google Drive v3 client authenticated as a service account.
pub struct GoogleDrive {
    config: DriveConfig,
    http: reqwest::Client,
    token: Mutex<Option<CachedToken>>,
}

impl GoogleDrive {
    pub fn new(config: &DriveConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            config: config.clone(),
            http,
            token: Mutex::new(None),
        })
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Returns a cached bearer token, exchanging a fresh signed assertion when needed.
    pub(crate) async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        let assertion = self.signed_assertion()?;
        tracing::debug!(account = %self.config.service_account_email, "requesting drive access token");
        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;
        let response = ensure_success(response, "token exchange").await?;
        let token: TokenResponse = response.json().await?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_REFRESH_MARGIN);
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }

    fn signed_assertion(&self) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.config.service_account_email,
            scope: DRIVE_SCOPE,
            aud: TOKEN_URL,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(self.config.private_key.as_bytes())
            .map_err(|e| AppError::Remote(format!("invalid service account private key: {}", e)))?;
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| AppError::Remote(format!("failed to sign token request: {}", e)))
    }
}

#[async_trait]
impl RemoteStore for GoogleDrive {
    async fn list(
        &self,
        folder_id: &str,
        name_prefix: &str,
        mime_type: &str,
        limit: usize,
    ) -> Result<Vec<RemoteBackupRecord>> {
        let token = self.access_token().await?;
        let query = list_query(folder_id, name_prefix, mime_type);
        tracing::info!(folder = %folder_id, %query, limit, "listing drive backups");

        let page_size = limit.to_string();
        let fields = format!("files({})", RECORD_FIELDS);
        let response = self
            .http
            .get(FILES_URL)
            .bearer_auth(&token)
            .query(&[
                ("q", query.as_str()),
                ("orderBy", "createdTime desc"),
                ("pageSize", page_size.as_str()),
                ("fields", fields.as_str()),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()
            .await?;
        let response = ensure_success(response, "file listing").await?;
        let mut listing: FileList = response.json().await?;

        // The API already orders and caps; keep the contract even if it does not.
        listing
            .files
            .sort_by(|a, b| b.created_time.cmp(&a.created_time));
        listing.files.truncate(limit);
        Ok(listing.files)
    }

    async fn upload(&self, local_path: &Path, folder_id: &str) -> Result<RemoteBackupRecord> {
        upload_file_to_drive(self, local_path, folder_id).await
    }

    async fn download(&self, record_id: &str, destination: &Path) -> Result<()> {
        download_file_from_drive(self, record_id, destination).await
    }
}

/// Drive search expression selecting live archives in one folder.
fn list_query(folder_id: &str, name_prefix: &str, mime_type: &str) -> String {
    format!(
        "'{}' in parents and name contains '{}' and mimeType = '{}' and trashed = false",
        escape_query_value(folder_id),
        escape_query_value(name_prefix),
        escape_query_value(mime_type)
    )
}

fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Turns a non-2xx response into a `Remote` error carrying status and body.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
    operation: &str,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::Remote(format!(
        "{} failed with status {}: {}",
        operation,
        status,
        body.trim()
    )))
}
