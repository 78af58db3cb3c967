//! Path management for facturas configuration and downloads.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find configuration directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Platform paths used by the client.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/facturas/          # Config directory (XDG on Linux)
/// └── config.toml              # Client configuration
///
/// ~/Downloads/                 # Default target for downloaded PDFs/ZIPs
/// ```
pub struct FacturasPaths;

impl FacturasPaths {
    /// Returns the facturas configuration directory.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join("facturas"))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Where downloads land when no output directory is given.
    ///
    /// Falls back to the current directory on systems without a
    /// downloads folder.
    pub fn download_dir() -> PathBuf {
        dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
    }
}
