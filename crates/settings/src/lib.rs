//! MPL Rewards Settings
//!
//! Persistent configuration for the rewards command line tools.
//!
//! ## Features
//!
//! - RPC endpoint, commitment and client mode
//! - Wallet keypair location
//! - Program address overrides for non-default deployments
//! - JSON serialization
//!
//! ## Usage
//!
//! ```no_run
//! use mplx_rewards_settings::{Settings, ClientModeSetting};
//!
//! // Load or create default settings
//! let mut settings = Settings::load_or_default()?;
//!
//! // Point at a local validator
//! settings.rpc.url = "http://127.0.0.1:8899".to_string();
//! settings.rpc.mode = ClientModeSetting::Live;
//!
//! // Save settings
//! settings.save()?;
//! # Ok::<(), mplx_rewards_settings::SettingsError>(())
//! ```

mod config;

pub use config::{ClientModeSetting, ProgramSettings, RpcSettings, Settings, WalletSettings};

use std::path::PathBuf;

use thiserror::Error;

/// Overrides the settings directory
pub const CONFIG_DIR_ENV: &str = "MPLX_REWARDS_CONFIG_DIR";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    ReadError(std::io::Error),

    #[error("Failed to write settings: {0}")]
    WriteError(std::io::Error),

    #[error("Failed to parse settings: {0}")]
    ParseError(serde_json::Error),

    #[error("Failed to create config directory: {0}")]
    CreateDirError(std::io::Error),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

/// Replace a leading `~` with the home directory.
pub fn expand_path(path: &str) -> PathBuf {
    match (path.strip_prefix('~'), home_dir()) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) if rest.starts_with('/') || rest.starts_with('\\') => {
            home.join(&rest[1..])
        }
        _ => PathBuf::from(path),
    }
}

/// `$MPLX_REWARDS_CONFIG_DIR`, else `~/.mplx-rewards`
pub fn default_config_dir() -> PathBuf {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => expand_path("~/.mplx-rewards"),
    }
}

/// Get the default settings file path
pub fn default_settings_path() -> PathBuf {
    default_config_dir().join("settings.json")
}
