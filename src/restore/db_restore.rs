// drivedump/src/restore/db_restore.rs
use std::fs::File;
use std::path::Path;
use std::process::Stdio;

use crate::config::DatabaseConfig;
use crate::database::{connection_args, run_tool};
use crate::errors::{AppError, Result};
use crate::utils::find_executable;

/// Arguments for `mysql` when replaying a dump.
pub fn import_args(config: &DatabaseConfig) -> Vec<String> {
    let mut args = connection_args(config);
    args.push(config.name.clone());
    args
}

/// Replays a dump into the configured database with `mysql`, feeding the file on stdin.
///
/// Destructive: existing contents of the target database are overwritten.
pub async fn import_database(config: &DatabaseConfig, source: &Path) -> Result<()> {
    if !source.is_file() {
        return Err(AppError::Import(format!(
            "dump file not found: {}",
            source.display()
        )));
    }

    let program = find_executable(config.import_bin.as_deref(), "mysql").map_err(AppError::Import)?;
    println!(
        "Importing {} into database {} using {}...",
        source.display(),
        config.name,
        program.display()
    );

    let dump_file = File::open(source).map_err(|e| {
        AppError::Import(format!("failed to open {}: {}", source.display(), e))
    })?;

    run_tool(&program, &import_args(config), Stdio::from(dump_file), Stdio::null())
        .await
        .map_err(AppError::Import)?;

    tracing::info!(database = %config.name, path = %source.display(), "dump imported");
    println!("✓ Database {} restored successfully.", config.name);
    Ok(())
}
