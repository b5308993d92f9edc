// drivedump/src/utils/cleanup.rs
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{Builder as TempDirBuilder, TempDir};

/// Removes every path that exists. Failures are logged and swallowed so that
/// cleanup never replaces the error of the pipeline it runs for.
pub fn cleanup(paths: &[PathBuf]) {
    for path in paths {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "nothing to clean up");
            continue;
        }
        match fs::remove_file(path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "removed temporary file");
                println!("🧹 Removed {}", path.display());
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove temporary file");
                eprintln!("⚠️ Could not remove {}: {}", path.display(), e);
            }
        }
    }
}

/// Local artifacts created by one backup or restore run.
///
/// Paths are registered right before the stage that writes them; `finish`
/// consumes the run so they reach `cleanup` exactly once. A run may own a
/// private scratch directory, removed after its artifacts.
#[derive(Debug)]
pub struct PipelineRun {
    name: String,
    artifacts: Vec<PathBuf>,
    scratch: Option<TempDir>,
}

impl PipelineRun {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artifacts: Vec::new(),
            scratch: None,
        }
    }

    /// Creates a fresh directory under `parent` that only this run writes into.
    /// Files named after remote records go here rather than into `parent`.
    pub fn scratch_dir(&mut self, parent: &Path) -> std::io::Result<PathBuf> {
        if let Some(dir) = &self.scratch {
            return Ok(dir.path().to_path_buf());
        }
        let dir = TempDirBuilder::new()
            .prefix(".drivedump-run-")
            .tempdir_in(parent)?;
        let path = dir.path().to_path_buf();
        tracing::debug!(run = %self.name, dir = %path.display(), "created scratch directory");
        self.scratch = Some(dir);
        Ok(path)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn register(&mut self, path: &Path) -> PathBuf {
        let path = path.to_path_buf();
        if !self.artifacts.contains(&path) {
            self.artifacts.push(path.clone());
        }
        path
    }

    /// Runs cleanup over the registered artifacts and returns them.
    pub fn finish(self) -> Vec<PathBuf> {
        tracing::info!(run = %self.name, count = self.artifacts.len(), "cleaning up pipeline artifacts");
        cleanup(&self.artifacts);
        if let Some(dir) = self.scratch {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                tracing::warn!(dir = %path.display(), error = %e, "failed to remove scratch directory");
                eprintln!("⚠️ Could not remove {}: {}", path.display(), e);
            }
        }
        self.artifacts
    }
}
