mod config;
pub mod database;

pub use config::{AccessibilityConfig, Config, FileConfigStore, NotificationsConfig};
pub use database::{Database, SessionRecord, Stats};

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::timer::CycleConfig;

/// Where the cycle configuration is sourced and persisted.
///
/// The runner consumes this seam so the same engine works whether the
/// embedder keeps configuration in a file, a database, or memory.
pub trait ConfigStore: Send + Sync {
    /// # Errors
    /// Returns an error if the backing store cannot be read or parsed.
    fn load_cycle(&self) -> Result<CycleConfig, ConfigError>;

    /// # Errors
    /// Returns an error if the backing store cannot be written.
    fn save_cycle(&self, config: &CycleConfig) -> Result<(), ConfigError>;
}

/// Returns `~/.config/focusloop[-dev]/` based on FOCUSLOOP_ENV.
///
/// Set FOCUSLOOP_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSLOOP_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focusloop-dev")
    } else {
        base_dir.join("focusloop")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
