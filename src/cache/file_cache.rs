//! cache::file_cache
//!
//! File-backed [`Cache`] implementation.
//!
//! Each key maps to one file under `{user-cache-dir}/uipath-cli/`, named by
//! the hex SHA-256 of the key with a `.cache` extension. File content is
//! `"<expiryEpoch>|<value>"`. The cache directory can be overridden with the
//! `UIPATH_CACHE_PATH` environment variable.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

use super::Cache;

const CACHE_DIR_ENV_VAR: &str = "UIPATH_CACHE_PATH";
const CACHE_SUBFOLDER: &str = "uipath-cli";
const CACHE_FILE_EXTENSION: &str = "cache";
const SEPARATOR: char = '|';

/// Stores cache entries on disk in order to preserve them across multiple
/// CLI invocations.
#[derive(Debug, Clone)]
pub struct FileCache {
    directory: Option<PathBuf>,
}

impl FileCache {
    /// Create a cache rooted at the default user cache directory.
    pub fn new() -> Self {
        Self { directory: None }
    }

    /// Create a cache rooted at an explicit directory.
    pub fn with_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: Some(directory.into()),
        }
    }

    fn cache_directory(&self) -> Option<PathBuf> {
        let directory = match &self.directory {
            Some(directory) => directory.clone(),
            None => match std::env::var(CACHE_DIR_ENV_VAR) {
                Ok(path) if !path.is_empty() => PathBuf::from(path),
                _ => dirs::cache_dir()?.join(CACHE_SUBFOLDER),
            },
        };
        create_private_dir(&directory).ok()?;
        Some(directory)
    }

    fn file_path(&self, key: &str) -> Option<PathBuf> {
        let file_name = hex::encode(Sha256::digest(key.as_bytes()));
        let mut path = self.cache_directory()?.join(file_name);
        path.set_extension(CACHE_FILE_EXTENSION);
        Some(path)
    }

    fn read_entry(&self, key: &str) -> Option<(i64, String)> {
        let path = self.file_path(key)?;
        let data = fs::read_to_string(path).ok()?;
        let (expiry, value) = data.split_once(SEPARATOR)?;
        let expiry = expiry.parse::<i64>().ok()?;
        Some((expiry, value.to_string()))
    }
}

impl Default for FileCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Cache for FileCache {
    fn get(&self, key: &str) -> Option<(String, i64)> {
        let (expiry, value) = self.read_entry(key)?;
        if now_epoch() >= expiry {
            return None;
        }
        Some((value, expiry))
    }

    fn set(&self, key: &str, value: &str, expires_in: i64) {
        if expires_in <= 0 {
            return;
        }
        let Some(path) = self.file_path(key) else {
            return;
        };
        let expiry = now_epoch() + expires_in;
        let data = format!("{}{}{}", expiry, SEPARATOR, value);
        let _ = write_private_file(&path, data.as_bytes());
    }
}

fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(unix)]
fn create_private_dir(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    match fs::DirBuilder::new().recursive(true).mode(0o700).create(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(not(unix))]
fn create_private_dir(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path)
}

#[cfg(unix)]
fn write_private_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(data)
}

#[cfg(not(unix))]
fn write_private_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    fs::write(path, data)
}
