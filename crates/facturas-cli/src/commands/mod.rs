pub mod analyze;
pub mod remote;
pub mod wake;

use anyhow::{Context, Result};
use facturas_core::{DownloadedFile, LocalFile};
use facturas_infrastructure::FacturasPaths;
use std::path::{Path, PathBuf};

/// Reads a file from disk into a `LocalFile` named after its last path segment.
pub fn read_local_file(path: &Path) -> Result<LocalFile> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("Not a file: {}", path.display()))?;
    Ok(LocalFile::new(name, bytes))
}

/// Writes a download into `dir` (or the downloads folder) and returns its path.
pub fn save_download(dir: Option<PathBuf>, file: &DownloadedFile) -> Result<PathBuf> {
    let dir = dir.unwrap_or_else(FacturasPaths::download_dir);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(&file.file_name);
    std::fs::write(&path, &file.bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
