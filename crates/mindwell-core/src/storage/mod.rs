mod config;
pub mod database;
mod store;

pub use config::{AudioConfig, AuthConfig, ChatConfig, Config, HistoryConfig, MeditationConfig};
pub use database::Database;
pub use store::{keys, load_json, save_json, MemoryStore, RecordStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `MINDWELL_DATA_DIR` wins when set. Otherwise `~/.config/mindwell[-dev]/`,
/// with `MINDWELL_ENV=dev` selecting the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("MINDWELL_DATA_DIR") {
        Some(explicit) if !explicit.is_empty() => PathBuf::from(explicit),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("MINDWELL_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("mindwell-dev")
            } else {
                base_dir.join("mindwell")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
