mod config;
pub mod database;
pub mod ports;

pub use config::{ClockConfig, Config, HeartsConfig};
pub use database::GameDb;

use std::path::PathBuf;

/// Returns `~/.config/shogidojo[-dev]/` based on SHOGIDOJO_ENV.
///
/// Set SHOGIDOJO_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("SHOGIDOJO_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("shogidojo-dev")
    } else {
        base_dir.join("shogidojo")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
