// File system locations for practice data
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to get app data directory")]
    NoAppDataDir,
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Get the app data directory for strumcoach
pub fn get_app_data_dir() -> StorageResult<PathBuf> {
    let data_dir = dirs::data_dir().ok_or(StorageError::NoAppDataDir)?;
    let app_dir = data_dir.join("com.strumcoach.app");
    fs::create_dir_all(&app_dir)?;
    Ok(app_dir)
}

/// Path of the practice database inside the app data directory
pub fn get_db_path() -> StorageResult<PathBuf> {
    Ok(get_app_data_dir()?.join("strumcoach.db"))
}
