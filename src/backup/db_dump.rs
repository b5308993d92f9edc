// drivedump/src/backup/db_dump.rs
use std::fs::File;
use std::path::Path;
use std::process::Stdio;

use crate::config::DatabaseConfig;
use crate::database::{connection_args, run_tool};
use crate::errors::{AppError, Result};
use crate::utils::find_executable;

/// Arguments for `mysqldump`: connection settings followed by the database name.
pub fn dump_args(config: &DatabaseConfig) -> Vec<String> {
    let mut args = connection_args(config);
    args.push(config.name.clone());
    args
}

/// Dumps the configured database with `mysqldump`, redirecting its stdout into `destination`.
///
/// On failure the destination may hold a partial dump; callers own its removal.
pub async fn dump_database(config: &DatabaseConfig, destination: &Path) -> Result<()> {
    let program = find_executable(config.dump_bin.as_deref(), "mysqldump").map_err(AppError::Dump)?;
    println!(
        "Dumping database {} to {} using {}...",
        config.name,
        destination.display(),
        program.display()
    );

    let dump_file = File::create(destination).map_err(|e| {
        AppError::Dump(format!("failed to create {}: {}", destination.display(), e))
    })?;

    run_tool(&program, &dump_args(config), Stdio::null(), Stdio::from(dump_file))
        .await
        .map_err(AppError::Dump)?;

    tracing::info!(database = %config.name, path = %destination.display(), "database dumped");
    println!("✓ Database {} dumped successfully.", config.name);
    Ok(())
}
