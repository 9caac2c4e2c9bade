mod config;
pub mod session_store;

pub use config::{Config, FocusConfig, RemoteConfig};
pub use session_store::{SessionStore, USER_ID_KEY, USER_KEY};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns `~/.config/lockin[-dev]/` based on LOCKIN_ENV.
///
/// Set LOCKIN_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("LOCKIN_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("lockin-dev")
    } else {
        base_dir.join("lockin")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
