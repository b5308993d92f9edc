// drivedump/src/config/mod.rs
use std::fmt;
use std::path::PathBuf;

use crate::errors::{AppError, Result};

const DEFAULT_LIST_LIMIT: usize = 10;

/// Connection settings handed to the dump and import tools.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: Option<u16>,
    pub user: String,
    /// Empty means the tools are invoked without any credential argument.
    pub password: String,
    pub name: String,
    pub dump_bin: Option<PathBuf>,
    pub import_bin: Option<PathBuf>,
}

impl DatabaseConfig {
    pub fn password(&self) -> Option<&str> {
        if self.password.is_empty() {
            None
        } else {
            Some(&self.password)
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password().map(|_| "<redacted>"))
            .field("name", &self.name)
            .field("dump_bin", &self.dump_bin)
            .field("import_bin", &self.import_bin)
            .finish()
    }
}

/// Google Drive service account and the folder holding the archives.
#[derive(Clone)]
pub struct DriveConfig {
    pub service_account_email: String,
    pub private_key: String,
    pub folder_id: String,
}

impl fmt::Debug for DriveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriveConfig")
            .field("service_account_email", &self.service_account_email)
            .field("private_key", &"<redacted>")
            .field("folder_id", &self.folder_id)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub drive: DriveConfig,
    pub work_dir: PathBuf,
    pub list_limit: usize,
}

impl AppConfig {
    /// Reads `.env` (if any) and then the process environment.
    pub fn load_from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Every missing required key is reported at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut required = |key: &'static str, allow_empty: bool| -> String {
            match lookup(key) {
                Some(value) if allow_empty || !value.trim().is_empty() => value,
                _ => {
                    missing.push(key);
                    String::new()
                }
            }
        };

        let host = required("DB_HOST", false);
        let user = required("DB_USER", false);
        let password = required("DB_PASSWORD", true);
        let name = required("DB_NAME", false);
        let service_account_email = required("GOOGLE_SERVICE_ACCOUNT_EMAIL", false);
        let private_key = required("GOOGLE_PRIVATE_KEY", false);
        let folder_id = required("GOOGLE_DRIVE_FOLDER_ID", false);

        if !missing.is_empty() {
            return Err(AppError::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = optional("DB_PORT")
            .map(|raw| {
                raw.trim()
                    .parse::<u16>()
                    .map_err(|_| AppError::Config(format!("DB_PORT is not a valid port: {}", raw)))
            })
            .transpose()?;

        let list_limit = match optional("BACKUP_LIST_LIMIT") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => limit,
                _ => {
                    return Err(AppError::Config(format!(
                        "BACKUP_LIST_LIMIT must be a positive integer, got: {}",
                        raw
                    )));
                }
            },
            None => DEFAULT_LIST_LIMIT,
        };

        Ok(AppConfig {
            database: DatabaseConfig {
                host,
                port,
                user,
                password,
                name,
                dump_bin: optional("MYSQLDUMP_BIN").map(PathBuf::from),
                import_bin: optional("MYSQL_BIN").map(PathBuf::from),
            },
            drive: DriveConfig {
                service_account_email,
                private_key: unescape_private_key(&private_key),
                folder_id,
            },
            work_dir: optional("BACKUP_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            list_limit,
        })
    }
}

/// Private keys are kept on a single line in env files with `\n` escapes.
fn unescape_private_key(raw: &str) -> String {
    raw.replace("\\n", "\n")
}
