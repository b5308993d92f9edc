pub mod cleanup;

use chrono::{DateTime, NaiveDateTime, Utc};
use std::path::{Path, PathBuf};
use which::which;

use crate::errors::{AppError, Result};

pub const ARCHIVE_SUFFIX: &str = ".zip";
const FS_SAFE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S-%3fZ";

/// Resolves a client tool: an explicitly configured path wins, otherwise `PATH` is searched.
pub fn find_executable(configured: Option<&Path>, name: &str) -> std::result::Result<PathBuf, String> {
    match configured {
        Some(path) => Ok(path.to_path_buf()),
        None => which(name).map_err(|e| {
            format!(
                "{} executable not found in PATH ({}). Please ensure the MySQL client tools are installed and in your PATH.",
                name, e
            )
        }),
    }
}

/// ISO-8601 UTC time with `:` and `.` replaced so it can be used in file names.
pub fn fs_safe_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
        .replace([':', '.'], "-")
}

/// Common file name prefix of every backup taken from `db_name`.
pub fn backup_prefix(db_name: &str) -> String {
    format!("backup-{}-", db_name)
}

pub fn dump_file_name(db_name: &str, timestamp: &str) -> String {
    format!("{}{}.sql", backup_prefix(db_name), timestamp)
}

pub fn archive_file_name(dump_file_name: &str) -> String {
    format!("{}{}", dump_file_name, ARCHIVE_SUFFIX)
}

/// True when `file_name` is exactly `backup-<db_name>-<timestamp>.sql.zip`.
pub fn is_backup_of(db_name: &str, file_name: &str) -> bool {
    file_name
        .strip_prefix(&backup_prefix(db_name))
        .and_then(|rest| rest.strip_suffix(ARCHIVE_SUFFIX))
        .and_then(|rest| rest.strip_suffix(".sql"))
        .is_some_and(|timestamp| NaiveDateTime::parse_from_str(timestamp, FS_SAFE_TIMESTAMP_FORMAT).is_ok())
}

/// Strips the literal `.zip` suffix from an archive file name.
pub fn extracted_file_name(archive_file_name: &str) -> Result<String> {
    match archive_file_name.strip_suffix(ARCHIVE_SUFFIX) {
        Some(stem) if !stem.is_empty() => Ok(stem.to_string()),
        _ => Err(AppError::Unpack(format!(
            "archive name '{}' does not end with '{}'",
            archive_file_name, ARCHIVE_SUFFIX
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_backup_file_names() -> anyhow::Result<()> {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let timestamp = fs_safe_timestamp(at);
        assert_eq!(timestamp, "2024-01-01T00-00-00-000Z");

        let dump = dump_file_name("shop", &timestamp);
        assert_eq!(dump, "backup-shop-2024-01-01T00-00-00-000Z.sql");
        assert_eq!(
            archive_file_name(&dump),
            "backup-shop-2024-01-01T00-00-00-000Z.sql.zip"
        );
        Ok(())
    }

    #[test]
    fn test_timestamp_keeps_milliseconds() {
        let at = Utc.timestamp_millis_opt(1_718_000_000_123).unwrap();
        let timestamp = fs_safe_timestamp(at);
        assert!(timestamp.ends_with("-123Z"));
        assert!(!timestamp.contains(':'));
        assert!(!timestamp.contains('.'));
    }

    #[test]
    fn test_extracted_name_strips_literal_suffix() -> anyhow::Result<()> {
        assert_eq!(
            extracted_file_name("backup-shop-2024-01-01T00-00-00-000Z.sql.zip")?,
            "backup-shop-2024-01-01T00-00-00-000Z.sql"
        );
        // Only the trailing occurrence is removed.
        assert_eq!(extracted_file_name("a.zip.sql.zip")?, "a.zip.sql");
        Ok(())
    }

    #[test]
    fn test_extracted_name_requires_suffix() {
        assert!(matches!(extracted_file_name("dump.sql"), Err(AppError::Unpack(_))));
        assert!(matches!(extracted_file_name(".zip"), Err(AppError::Unpack(_))));
    }

    #[test]
    fn test_backup_names_are_matched_per_database() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let own = archive_file_name(&dump_file_name("shop", &fs_safe_timestamp(at)));
        let other = archive_file_name(&dump_file_name("shop-eu", &fs_safe_timestamp(at)));

        assert!(is_backup_of("shop", &own));
        assert!(is_backup_of("shop-eu", &other));
        assert!(!is_backup_of("shop", &other));
        assert!(!is_backup_of("shop", "backup-shop-2024-01-01T00-00-00-000Z.sql"));
        assert!(!is_backup_of("shop", "backup-shop-latest.sql.zip"));
    }

    #[test]
    fn test_configured_executable_wins() {
        let path = find_executable(Some(Path::new("/opt/bin/mysqldump")), "mysqldump");
        assert_eq!(path, Ok(PathBuf::from("/opt/bin/mysqldump")));
    }
}
