//! In-memory stand-ins for the database tools and the remote store.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config::{AppConfig, DriveConfig};
use crate::database::DatabaseTool;
use crate::database::test_support::database_config;
use crate::errors::{AppError, Result};
use crate::storage::{RemoteBackupRecord, RemoteStore};

pub const DUMP_CONTENT: &str = "CREATE TABLE orders (id INT);\nINSERT INTO orders VALUES (1);\n";

pub fn app_config(work_dir: &Path) -> AppConfig {
    AppConfig {
        database: database_config(""),
        drive: DriveConfig {
            service_account_email: "svc@example.iam.gserviceaccount.com".to_string(),
            private_key: String::new(),
            folder_id: "folder123".to_string(),
        },
        work_dir: work_dir.to_path_buf(),
        list_limit: 10,
    }
}

pub fn record(id: &str, name: &str, hour: u32) -> RemoteBackupRecord {
    RemoteBackupRecord {
        id: id.to_string(),
        name: name.to_string(),
        created_time: Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap(),
    }
}

#[derive(Default)]
pub struct FakeDatabase {
    pub dump_error: Option<String>,
    pub import_error: Option<String>,
    pub dumps: Mutex<Vec<PathBuf>>,
    pub imports: Mutex<Vec<(PathBuf, String)>>,
}

#[async_trait]
impl DatabaseTool for FakeDatabase {
    async fn produce_dump(&self, destination: &Path) -> Result<()> {
        self.dumps.lock().unwrap().push(destination.to_path_buf());
        if let Some(stderr) = &self.dump_error {
            // Real tools leave a partial file behind when they fail mid-way.
            fs::write(destination, "-- partial")?;
            return Err(AppError::Dump(format!("mysqldump exited with exit status: 1: {}", stderr)));
        }
        fs::write(destination, DUMP_CONTENT)?;
        Ok(())
    }

    async fn import_dump(&self, source: &Path) -> Result<()> {
        let content = fs::read_to_string(source)?;
        self.imports.lock().unwrap().push((source.to_path_buf(), content));
        match &self.import_error {
            Some(stderr) => Err(AppError::Import(stderr.clone())),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct FakeStore {
    pub records: Vec<RemoteBackupRecord>,
    pub contents: HashMap<String, Vec<u8>>,
    pub upload_error: bool,
    pub download_error: bool,
    pub download_refused: bool,
    pub list_calls: Mutex<Vec<(String, String, String, usize)>>,
    pub uploads: Mutex<Vec<(PathBuf, String, Vec<u8>)>>,
    pub downloads: Mutex<Vec<(String, PathBuf)>>,
}

#[async_trait]
impl RemoteStore for FakeStore {
    async fn list(
        &self,
        folder_id: &str,
        name_prefix: &str,
        mime_type: &str,
        limit: usize,
    ) -> Result<Vec<RemoteBackupRecord>> {
        self.list_calls.lock().unwrap().push((
            folder_id.to_string(),
            name_prefix.to_string(),
            mime_type.to_string(),
            limit,
        ));
        Ok(self.records.iter().take(limit).cloned().collect())
    }

    async fn upload(&self, local_path: &Path, folder_id: &str) -> Result<RemoteBackupRecord> {
        let bytes = fs::read(local_path)?;
        self.uploads
            .lock()
            .unwrap()
            .push((local_path.to_path_buf(), folder_id.to_string(), bytes));
        if self.upload_error {
            return Err(AppError::Remote("file upload failed with status 503".to_string()));
        }
        let name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(record("uploaded-1", &name, 12))
    }

    async fn download(&self, record_id: &str, destination: &Path) -> Result<()> {
        self.downloads
            .lock()
            .unwrap()
            .push((record_id.to_string(), destination.to_path_buf()));
        if self.download_refused {
            return Err(AppError::Remote("file download failed with status 403".to_string()));
        }
        if self.download_error {
            // Partial body written before the connection dropped.
            fs::write(destination, b"PK")?;
            return Err(AppError::Remote("connection reset".to_string()));
        }
        let bytes = self
            .contents
            .get(record_id)
            .ok_or_else(|| AppError::Remote(format!("file {} not found", record_id)))?;
        fs::write(destination, bytes)?;
        Ok(())
    }
}

/// Builds zip bytes wrapping `content` under `entry_name`.
pub fn zip_bytes(entry_name: &str, content: &str) -> anyhow::Result<Vec<u8>> {
    let dir = tempfile::tempdir()?;
    let source = dir.path().join(entry_name);
    fs::write(&source, content)?;
    let archive = dir.path().join(format!("{}.zip", entry_name));
    crate::backup::archive::create_zip_archive(&source, &archive)?;
    Ok(fs::read(archive)?)
}

/// Files currently present in `dir`.
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
