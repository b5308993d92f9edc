mod logic;
pub(crate) mod drive_download;
pub(crate) mod db_restore;

pub use logic::RestoreOutcome;

use crate::config::AppConfig;
use crate::database::DatabaseTool;
use crate::errors::Result;
use crate::prompt::Prompter;
use crate::storage::RemoteStore;

/// Public entry point for the restore process.
/// Reports how the run ended; declining the confirmation is not an error.
pub async fn run_restore_flow(
    app_config: &AppConfig,
    database: &dyn DatabaseTool,
    store: &dyn RemoteStore,
    prompter: &dyn Prompter,
) -> Result<RestoreOutcome> {
    let outcome = logic::perform_restore_orchestration(app_config, database, store, prompter).await?;
    match &outcome {
        RestoreOutcome::NothingToRestore => {
            println!("ℹ️ No backups found for database {}.", app_config.database.name)
        }
        RestoreOutcome::Cancelled => println!("ℹ️ Restore cancelled. Nothing was changed."),
        RestoreOutcome::Restored(record) => println!(
            "✅ Database {} restored from {}.",
            app_config.database.name, record.name
        ),
    }
    Ok(outcome)
}
