// drivedump/src/backup/logic.rs
use chrono::Utc;
use std::path::Path;

use super::archive::create_zip_archive;
use crate::config::AppConfig;
use crate::database::DatabaseTool;
use crate::errors::Result;
use crate::storage::{RemoteBackupRecord, RemoteStore};
use crate::utils::cleanup::PipelineRun;
use crate::utils::{archive_file_name, dump_file_name, fs_safe_timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSummary {
    pub record: RemoteBackupRecord,
    pub archive_bytes: u64,
}

/// Dump -> pack -> upload, then cleanup of every local artifact whatever the outcome.
pub async fn perform_backup_orchestration(
    app_config: &AppConfig,
    database: &dyn DatabaseTool,
    store: &dyn RemoteStore,
    timestamp: &str,
) -> Result<BackupSummary> {
    let dump_name = dump_file_name(&app_config.database.name, timestamp);
    let mut run = PipelineRun::new(dump_name.trim_end_matches(".sql"));
    tracing::info!(run = %run.name(), "backup started");

    let result = run_stages(app_config, database, store, &dump_name, &mut run).await;
    let run_name = run.name().to_string();
    run.finish();

    match &result {
        Ok(summary) => tracing::info!(run = %run_name, id = %summary.record.id, "backup succeeded"),
        Err(e) => tracing::error!(run = %run_name, error = %e, "backup failed"),
    }
    result
}

async fn run_stages(
    app_config: &AppConfig,
    database: &dyn DatabaseTool,
    store: &dyn RemoteStore,
    dump_name: &str,
    run: &mut PipelineRun,
) -> Result<BackupSummary> {
    let work_dir: &Path = &app_config.work_dir;
    if !work_dir.exists() {
        tokio::fs::create_dir_all(work_dir).await?;
    }

    let dump_path = run.register(&work_dir.join(dump_name));
    println!("📦 Dumping database {}...", app_config.database.name);
    database.produce_dump(&dump_path).await?;

    let archive_path = run.register(&work_dir.join(archive_file_name(dump_name)));
    println!("🗜️ Compressing dump...");
    let archive_bytes = create_zip_archive(&dump_path, &archive_path)?;

    println!("☁️ Uploading archive...");
    let record = store
        .upload(&archive_path, &app_config.drive.folder_id)
        .await?;

    Ok(BackupSummary {
        record,
        archive_bytes,
    })
}

/// Current time rendered for use in backup file names.
pub fn current_timestamp() -> String {
    fs_safe_timestamp(Utc::now())
}
