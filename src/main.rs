//! Database Backup/Restore Tool
//!
//! Dumps a MySQL database into a zip archive on Google Drive and restores it on demand.

// drivedump/src/main.rs
mod backup;
mod config;
mod database;
mod errors;
mod prompt;
mod restore;
mod storage;
mod utils;
#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use config::AppConfig;
use database::{DatabaseTool, MySqlCli};
use prompt::{MenuAction, Prompter, TerminalPrompter};
use std::process::ExitCode;
use storage::{GoogleDrive, RemoteStore};
use tracing_subscriber::EnvFilter;

/// Main entry point for the backup/restore tool
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run_app().await {
        Ok(_) => {
            println!("👋 Bye.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_app() -> Result<()> {
    let app_config = AppConfig::load_from_env().context("Failed to load configuration from environment")?;
    tracing::debug!(config = ?app_config, "configuration loaded");

    let database = MySqlCli::new(&app_config.database);
    let store = GoogleDrive::new(&app_config.drive).context("Failed to initialise Google Drive client")?;
    let prompter = TerminalPrompter::new();

    run_menu(&app_config, &database, &store, &prompter).await
}

/// Shows the menu until the operator exits or a pipeline fails.
async fn run_menu(
    app_config: &AppConfig,
    database: &dyn DatabaseTool,
    store: &dyn RemoteStore,
    prompter: &dyn Prompter,
) -> Result<()> {
    loop {
        match prompter.choose_action().context("Failed to read menu choice")? {
            MenuAction::Backup => {
                println!("🚀 Starting Backup Process...");
                backup::run_backup_flow(app_config, database, store)
                    .await
                    .context("Backup process failed")?;
            }
            MenuAction::Restore => {
                println!("🔄 Starting Restore Process...");
                restore::run_restore_flow(app_config, database, store, prompter)
                    .await
                    .context("Restore process failed")?;
            }
            MenuAction::Exit => return Ok(()),
        }
    }
}
