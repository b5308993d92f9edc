// drivedump/src/database/mod.rs
use async_trait::async_trait;
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::process::Command;

use crate::backup::db_dump::dump_database;
use crate::config::DatabaseConfig;
use crate::errors::Result;
use crate::restore::db_restore::import_database;

/// The database's own export and import tools.
#[async_trait]
pub trait DatabaseTool: Send + Sync {
    /// Writes a full dump of the configured database to `destination`.
    async fn produce_dump(&self, destination: &Path) -> Result<()>;

    /// Replays `source` into the configured database, overwriting its contents.
    async fn import_dump(&self, source: &Path) -> Result<()>;
}

/// `mysqldump` / `mysql` client tools.
#[derive(Debug, Clone)]
pub struct MySqlCli {
    config: DatabaseConfig,
}

impl MySqlCli {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

#[async_trait]
impl DatabaseTool for MySqlCli {
    async fn produce_dump(&self, destination: &Path) -> Result<()> {
        dump_database(&self.config, destination).await
    }

    async fn import_dump(&self, source: &Path) -> Result<()> {
        import_database(&self.config, source).await
    }
}

/// Host, port, user and credential arguments shared by both tools.
///
/// The password argument is left out entirely when no password is set.
pub fn connection_args(config: &DatabaseConfig) -> Vec<String> {
    let mut args = vec!["-h".to_string(), config.host.clone()];
    if let Some(port) = config.port {
        args.push("-P".to_string());
        args.push(port.to_string());
    }
    args.push("-u".to_string());
    args.push(config.user.clone());
    if let Some(password) = config.password() {
        args.push(format!("--password={}", password));
    }
    args
}

/// Runs a client tool with the given stdin/stdout and captures stderr.
///
/// `output()` would replace the stdout redirect with a pipe, so the child is
/// spawned and awaited instead; only stderr ends up in the returned `Output`.
/// Returns the diagnostic text on spawn failure or non-zero exit.
pub(crate) async fn run_tool(
    program: &Path,
    args: &[String],
    stdin: Stdio,
    stdout: Stdio,
) -> std::result::Result<Output, String> {
    let child = Command::new(program)
        .args(args)
        .stdin(stdin)
        .stdout(stdout)
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("failed to start {}: {}", program.display(), e))?;
    let output = child
        .wait_with_output()
        .await
        .map_err(|e| format!("failed to wait for {}: {}", program.display(), e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "{} exited with {}: {}",
            program.display(),
            output.status,
            stderr.trim()
        ));
    }
    Ok(output)
}


#[cfg(test)]
mod tests {
    use super::test_support::database_config;
    use super::*;

    #[test]
    fn test_connection_args_with_password() {
        let args = connection_args(&database_config("s3cret"));
        assert_eq!(args, vec!["-h", "db.internal", "-u", "backup", "--password=s3cret"]);
    }

    #[test]
    fn test_empty_password_omits_credential_argument() {
        let args = connection_args(&database_config(""));
        assert_eq!(args, vec!["-h", "db.internal", "-u", "backup"]);
        assert!(!args.iter().any(|a| a.starts_with("--password") || a.starts_with("-p")));
    }

    #[test]
    fn test_port_is_passed_when_configured() {
        let mut config = database_config("");
        config.port = Some(3307);
        let args = connection_args(&config);
        assert_eq!(args, vec!["-h", "db.internal", "-P", "3307", "-u", "backup"]);
    }
}
