mod logic;
pub(crate) mod drive_upload;
pub(crate) mod archive;
pub(crate) mod db_dump;

pub use logic::BackupSummary;

use crate::config::AppConfig;
use crate::database::DatabaseTool;
use crate::errors::Result;
use crate::storage::RemoteStore;

/// Public entry point for the backup process.
/// Names the run after the current time and reports the uploaded archive.
pub async fn run_backup_flow(
    app_config: &AppConfig,
    database: &dyn DatabaseTool,
    store: &dyn RemoteStore,
) -> Result<BackupSummary> {
    let timestamp = logic::current_timestamp();
    let summary = logic::perform_backup_orchestration(app_config, database, store, &timestamp).await?;
    println!(
        "✅ Backup {} uploaded ({} bytes, Drive id {}).",
        summary.record.name, summary.archive_bytes, summary.record.id
    );
    Ok(summary)
}
