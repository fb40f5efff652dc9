//! JSON persistence helpers for ~/.cube-optimizer/ data files.

use crate::error::LoadError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Get the ~/.cube-optimizer/ directory path, creating it if needed.
pub fn data_dir() -> io::Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "Could not determine home directory",
        )
    })?;
    let dir = home_dir.join(".cube-optimizer");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Get the full path for a data file in ~/.cube-optimizer/.
pub fn data_path(filename: &str) -> io::Result<PathBuf> {
    Ok(data_dir()?.join(filename))
}

/// Read and parse a JSON file. Missing or malformed files are errors.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Save a value as pretty-printed JSON, creating parent directories.
pub fn save_json<T: Serialize>(path: &Path, data: &T) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, json)
}
