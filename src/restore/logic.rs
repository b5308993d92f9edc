// drivedump/src/restore/logic.rs
use std::path::Path;

use crate::backup::archive::extract_zip_archive;
use crate::config::AppConfig;
use crate::database::DatabaseTool;
use crate::errors::{AppError, Result};
use crate::prompt::Prompter;
use crate::storage::{RemoteBackupRecord, RemoteStore, ARCHIVE_MIME_TYPE};
use crate::utils::{backup_prefix, is_backup_of};
use crate::utils::cleanup::PipelineRun;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The remote folder holds no backups for this database.
    NothingToRestore,
    /// The operator declined the confirmation; nothing was touched.
    Cancelled,
    Restored(RemoteBackupRecord),
}

/// List -> select -> confirm -> download -> unpack -> import, then cleanup.
///
/// Nothing is written locally before the operator confirms.
pub async fn perform_restore_orchestration(
    app_config: &AppConfig,
    database: &dyn DatabaseTool,
    store: &dyn RemoteStore,
    prompter: &dyn Prompter,
) -> Result<RestoreOutcome> {
    let prefix = backup_prefix(&app_config.database.name);
    println!("🔎 Looking for backups of {}...", app_config.database.name);
    let records = store
        .list(
            &app_config.drive.folder_id,
            &prefix,
            ARCHIVE_MIME_TYPE,
            app_config.list_limit,
        )
        .await?;

    // `name contains` also matches other databases sharing the prefix, e.g. `shop-eu`.
    let records: Vec<RemoteBackupRecord> = records
        .into_iter()
        .filter(|record| is_backup_of(&app_config.database.name, &record.name))
        .collect();

    if records.is_empty() {
        tracing::info!(prefix = %prefix, "no backups found");
        return Ok(RestoreOutcome::NothingToRestore);
    }

    let labels: Vec<String> = records.iter().map(RemoteBackupRecord::label).collect();
    let index = prompter.select_backup(&labels)?;
    let record = records.get(index).cloned().ok_or_else(|| {
        AppError::InvalidInput(format!("selection {} is out of range", index))
    })?;

    let question = format!(
        "Restore {} into database '{}'? This overwrites its current contents",
        record.name, app_config.database.name
    );
    if !prompter.confirm(&question)? {
        tracing::info!(name = %record.name, "restore cancelled by user");
        return Ok(RestoreOutcome::Cancelled);
    }

    let mut run = PipelineRun::new(format!("restore-{}", record.name));
    tracing::info!(run = %run.name(), id = %record.id, "restore started");
    let result = run_stages(app_config, database, store, &record, &mut run).await;
    let run_name = run.name().to_string();
    run.finish();

    match result {
        Ok(()) => {
            tracing::info!(run = %run_name, "restore succeeded");
            Ok(RestoreOutcome::Restored(record))
        }
        Err(e) => {
            tracing::error!(run = %run_name, error = %e, "restore failed");
            Err(e)
        }
    }
}

async fn run_stages(
    app_config: &AppConfig,
    database: &dyn DatabaseTool,
    store: &dyn RemoteStore,
    record: &RemoteBackupRecord,
    run: &mut PipelineRun,
) -> Result<()> {
    let work_dir: &Path = &app_config.work_dir;
    if !work_dir.exists() {
        tokio::fs::create_dir_all(work_dir).await?;
    }
    let stage_dir = run.scratch_dir(work_dir)?;

    // The record name comes from the remote side; only its final component is used locally.
    let archive_name = Path::new(&record.name)
        .file_name()
        .ok_or_else(|| AppError::Remote(format!("invalid remote file name: {}", record.name)))?;

    let archive_path = run.register(&stage_dir.join(archive_name));
    println!("☁️ Downloading {}...", record.name);
    store.download(&record.id, &archive_path).await?;

    println!("🗜️ Extracting archive...");
    let dump_path = extract_zip_archive(&archive_path, &stage_dir)?;
    run.register(&dump_path);

    println!("🛢️ Importing into {}...", app_config.database.name);
    database.import_dump(&dump_path).await?;
    Ok(())
}
