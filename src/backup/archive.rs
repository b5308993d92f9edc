// drivedump/src/backup/archive.rs
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::errors::{AppError, Result};
use crate::utils::extracted_file_name;

const MAX_DEFLATE_LEVEL: i32 = 9;

/// Compresses a single file into a zip archive at maximum compression.
///
/// The entry is named after the source file. The archive is only reported
/// once the writer has finished and the file is synced; on failure the
/// partial archive is removed.
///
/// # Returns
/// Size of the archive in bytes.
pub fn create_zip_archive(source_path: &Path, archive_dest_path: &Path) -> Result<u64> {
    println!(
        "Compressing {} into {}",
        source_path.display(),
        archive_dest_path.display()
    );

    match write_zip_archive(source_path, archive_dest_path) {
        Ok(bytes) => {
            println!(
                "✓ Archive created at {} ({} bytes)",
                archive_dest_path.display(),
                bytes
            );
            Ok(bytes)
        }
        Err(e) => {
            if archive_dest_path.exists() {
                let _ = fs::remove_file(archive_dest_path);
            }
            Err(e)
        }
    }
}

fn write_zip_archive(source_path: &Path, archive_dest_path: &Path) -> Result<u64> {
    let entry_name = source_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::Pack(format!("invalid source file name: {}", source_path.display())))?;

    let source = File::open(source_path).map_err(|e| {
        AppError::Pack(format!("failed to open {}: {}", source_path.display(), e))
    })?;
    let mut reader = BufReader::new(source);

    let archive_file = File::create(archive_dest_path).map_err(|e| {
        AppError::Pack(format!("failed to create {}: {}", archive_dest_path.display(), e))
    })?;
    let mut zip = ZipWriter::new(BufWriter::new(archive_file));
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(MAX_DEFLATE_LEVEL))
        .large_file(true);

    zip.start_file(entry_name, options)
        .map_err(|e| AppError::Pack(format!("failed to start entry {}: {}", entry_name, e)))?;
    io::copy(&mut reader, &mut zip).map_err(|e| {
        AppError::Pack(format!("failed to compress {}: {}", source_path.display(), e))
    })?;

    let writer = zip
        .finish()
        .map_err(|e| AppError::Pack(format!("failed to finish archive: {}", e)))?;
    let archive_file = writer
        .into_inner()
        .map_err(|e| AppError::Pack(format!("failed to flush archive: {}", e.error())))?;
    archive_file
        .sync_all()
        .map_err(|e| AppError::Pack(format!("failed to sync archive: {}", e)))?;

    let bytes = archive_file
        .metadata()
        .map_err(|e| AppError::Pack(format!("failed to stat archive: {}", e)))?
        .len();
    Ok(bytes)
}

/// Extracts the single entry of a zip archive into `extract_to_dir`.
///
/// The output file name is the archive file name without its `.zip` suffix,
/// independent of the entry name stored inside the archive.
///
/// # Returns
/// Path to the extracted file.
pub fn extract_zip_archive(archive_path: &Path, extract_to_dir: &Path) -> Result<PathBuf> {
    let archive_name = archive_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::Unpack(format!("invalid archive path: {}", archive_path.display())))?;
    let destination = extract_to_dir.join(extracted_file_name(archive_name)?);

    println!(
        "Extracting {} to {}",
        archive_path.display(),
        destination.display()
    );

    let archive_file = File::open(archive_path).map_err(|e| {
        AppError::Unpack(format!("failed to open {}: {}", archive_path.display(), e))
    })?;
    let mut archive = ZipArchive::new(BufReader::new(archive_file))
        .map_err(|e| AppError::Unpack(format!("corrupt archive {}: {}", archive_path.display(), e)))?;

    if archive.len() != 1 {
        return Err(AppError::Unpack(format!(
            "expected exactly one entry in {}, found {}",
            archive_path.display(),
            archive.len()
        )));
    }

    let mut entry = archive
        .by_index(0)
        .map_err(|e| AppError::Unpack(format!("failed to read archive entry: {}", e)))?;
    if !extract_to_dir.exists() {
        fs::create_dir_all(extract_to_dir)?;
    }
    let mut output = BufWriter::new(File::create(&destination).map_err(|e| {
        AppError::Unpack(format!("failed to create {}: {}", destination.display(), e))
    })?);
    io::copy(&mut entry, &mut output).map_err(|e| {
        AppError::Unpack(format!("failed to extract {}: {}", entry.name(), e))
    })?;
    let output = output
        .into_inner()
        .map_err(|e| AppError::Unpack(format!("failed to flush {}: {}", destination.display(), e.error())))?;
    output.sync_all()?;

    println!("✓ Extracted {}", destination.display());
    Ok(destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;

    #[test]
    fn test_pack_then_unpack_is_byte_identical() -> anyhow::Result<()> {
        let work = tempdir()?;
        let out = tempdir()?;
        let dump = work.path().join("backup-shop-1.sql");
        let content: Vec<u8> = (0..200_000u32)
            .flat_map(|i| format!("INSERT INTO t VALUES ({});\n", i % 977).into_bytes())
            .collect();
        fs::write(&dump, &content)?;

        let archive = work.path().join("backup-shop-1.sql.zip");
        let bytes = create_zip_archive(&dump, &archive)?;
        assert_eq!(bytes, fs::metadata(&archive)?.len());
        assert!(bytes < content.len() as u64);

        let extracted = extract_zip_archive(&archive, out.path())?;
        assert_eq!(extracted, out.path().join("backup-shop-1.sql"));
        assert_eq!(fs::read(&extracted)?, content);
        Ok(())
    }

    #[test]
    fn test_entry_keeps_source_file_name() -> anyhow::Result<()> {
        let work = tempdir()?;
        let dump = work.path().join("backup-shop-2.sql");
        fs::write(&dump, b"CREATE TABLE t (id INT);\n")?;
        let archive = work.path().join("backup-shop-2.sql.zip");
        create_zip_archive(&dump, &archive)?;

        let mut zip = ZipArchive::new(File::open(&archive)?)?;
        assert_eq!(zip.len(), 1);
        let mut entry = zip.by_index(0)?;
        assert_eq!(entry.name(), "backup-shop-2.sql");
        assert_eq!(entry.compression(), CompressionMethod::Deflated);
        let mut text = String::new();
        entry.read_to_string(&mut text)?;
        assert_eq!(text, "CREATE TABLE t (id INT);\n");
        Ok(())
    }

    #[test]
    fn test_pack_missing_source_leaves_no_archive() -> anyhow::Result<()> {
        let work = tempdir()?;
        let archive = work.path().join("missing.sql.zip");
        let result = create_zip_archive(&work.path().join("missing.sql"), &archive);
        assert!(matches!(result, Err(AppError::Pack(_))));
        assert!(!archive.exists());
        Ok(())
    }

    #[test]
    fn test_unpack_corrupt_archive_fails() -> anyhow::Result<()> {
        let work = tempdir()?;
        let archive = work.path().join("broken.sql.zip");
        fs::write(&archive, b"definitely not a zip file")?;
        let result = extract_zip_archive(&archive, work.path());
        assert!(matches!(result, Err(AppError::Unpack(_))));
        Ok(())
    }

    #[test]
    fn test_unpack_creates_missing_destination_dir() -> anyhow::Result<()> {
        let work = tempdir()?;
        let dump = work.path().join("db.sql");
        fs::write(&dump, b"SELECT 1;\n")?;
        let archive = work.path().join("db.sql.zip");
        create_zip_archive(&dump, &archive)?;

        let nested = work.path().join("restore").join("tmp");
        let extracted = extract_zip_archive(&archive, &nested)?;
        assert_eq!(fs::read(extracted)?, b"SELECT 1;\n");
        Ok(())
    }
}
