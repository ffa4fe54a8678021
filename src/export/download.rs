use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context as _;

use crate::foundation::error::{PoseplayError, PoseplayResult};

/// Create the parent directory of `path` if it is missing.
pub fn ensure_parent_dir(path: &Path) -> PoseplayResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Derive the exported filename for a clip: `<basename-without-dir-and-ext><suffix>.<ext>`.
///
/// Both `/` and `\` are treated as directory separators so URIs and Windows paths behave alike.
/// Only the last extension is stripped (`a.b.mp4` -> `a.b`); a leading dot is part of the name.
pub fn export_filename(source_uri: &str, suffix: &str, extension: &str) -> String {
    let trimmed = source_uri.trim_end_matches(['/', '\\']);
    let name = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);
    // Drop URI query/fragment.
    let name = name.split(['?', '#']).next().unwrap_or(name);
    let stem = match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    };
    let stem = if stem.is_empty() { "clip" } else { stem };
    format!("{stem}{suffix}.{extension}")
}

/// Receiver of assembled export artifacts.
pub trait DownloadSink {
    /// Deliver `bytes` under `filename`; returns where the artifact ended up.
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> PoseplayResult<PathBuf>;
}

/// Writes downloads into a directory, creating it when missing.
#[derive(Clone, Debug)]
pub struct DirectoryDownload {
    dir: PathBuf,
}

impl DirectoryDownload {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectoryDownload {
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> PoseplayResult<PathBuf> {
        if filename.is_empty() || filename.contains(['/', '\\']) {
            return Err(PoseplayError::validation(format!(
                "download filename must be a bare file name, got '{filename}'"
            )));
        }
        let path = self.dir.join(filename);
        ensure_parent_dir(&path)?;
        std::fs::write(&path, bytes)
            .with_context(|| format!("failed to write download '{}'", path.display()))?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "download written");
        Ok(path)
    }
}

/// Keeps downloads in memory. Clones share the same store.
#[derive(Clone, Debug, Default)]
pub struct InMemoryDownloads {
    files: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl InMemoryDownloads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes delivered under `filename`, if any.
    pub fn get(&self, filename: &str) -> Option<Vec<u8>> {
        self.lock().get(filename).cloned()
    }

    /// Delivered filenames, sorted.
    pub fn filenames(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.files
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DownloadSink for InMemoryDownloads {
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> PoseplayResult<PathBuf> {
        self.lock().insert(filename.to_owned(), bytes.to_vec());
        Ok(PathBuf::from(filename))
    }
}
