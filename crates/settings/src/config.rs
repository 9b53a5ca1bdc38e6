//! Configuration types

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{default_settings_path, expand_path, Result, SettingsError};

/// Main settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Cluster connection
    #[serde(default)]
    pub rpc: RpcSettings,

    /// Signing wallet
    #[serde(default)]
    pub wallet: WalletSettings,

    /// Program address overrides
    #[serde(default)]
    pub programs: ProgramSettings,

    /// Custom settings file path (not serialized)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

impl Settings {
    /// Load settings from the default path, or create defaults
    pub fn load_or_default() -> Result<Self> {
        Self::load_from(&default_settings_path())
    }

    /// Load settings from a specific path, or create defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(SettingsError::ReadError)?;
            let mut settings: Settings =
                serde_json::from_str(&content).map_err(SettingsError::ParseError)?;
            settings.config_path = Some(path.to_path_buf());
            info!("Loaded settings from {:?}", path);
            Ok(settings)
        } else {
            Ok(Self {
                config_path: Some(path.to_path_buf()),
                ..Self::default()
            })
        }
    }

    /// Save settings to the configured path
    pub fn save(&self) -> Result<()> {
        let path = self.config_path.clone().unwrap_or_else(default_settings_path);
        self.save_to(&path)
    }

    /// Save settings to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(SettingsError::CreateDirError)?;
            }
        }

        let content = serde_json::to_string_pretty(self).map_err(SettingsError::ParseError)?;
        std::fs::write(path, content).map_err(SettingsError::WriteError)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// File these settings were loaded from, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

/// RPC settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcSettings {
    /// JSON-RPC endpoint
    #[serde(default = "default_rpc_url")]
    pub url: String,

    /// processed / confirmed / finalized
    #[serde(default = "default_commitment")]
    pub commitment: String,

    #[serde(default)]
    pub mode: ClientModeSetting,
}

fn default_rpc_url() -> String {
    "https://api.devnet.solana.com".to_string()
}

fn default_commitment() -> String {
    "confirmed".to_string()
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            url: default_rpc_url(),
            commitment: default_commitment(),
            mode: ClientModeSetting::default(),
        }
    }
}

/// Client mode as stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClientModeSetting {
    /// In-memory accounts, nothing is sent
    Mock,
    /// Talk to the configured RPC endpoint
    #[default]
    Live,
}

/// Wallet settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletSettings {
    /// Solana CLI style JSON keypair file
    #[serde(default = "default_keypair_path")]
    pub keypair_path: String,
}

fn default_keypair_path() -> String {
    "~/.config/solana/id.json".to_string()
}

impl Default for WalletSettings {
    fn default() -> Self {
        Self {
            keypair_path: default_keypair_path(),
        }
    }
}

impl WalletSettings {
    /// Keypair path with `~` expanded
    pub fn resolved_keypair_path(&self) -> PathBuf {
        expand_path(&self.keypair_path)
    }
}

/// Program address overrides, registry name to base58 address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSettings {
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_settings_path(tag: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("mplx-rewards-settings-{}-{}", tag, std::process::id()))
            .join("settings.json")
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.rpc.url, "https://api.devnet.solana.com");
        assert_eq!(settings.rpc.commitment, "confirmed");
        assert_eq!(settings.rpc.mode, ClientModeSetting::Live);
        assert!(settings.wallet.keypair_path.ends_with("id.json"));
        assert!(settings.programs.overrides.is_empty());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"rpc": {"mode": "mock"}}"#).unwrap();
        assert_eq!(settings.rpc.mode, ClientModeSetting::Mock);
        assert_eq!(settings.rpc.commitment, "confirmed");
        assert_eq!(settings.wallet.keypair_path, default_keypair_path());
    }

    #[test]
    fn test_program_overrides_parse() {
        let settings: Settings = serde_json::from_str(
            r#"{"programs": {"overrides": {"mplxRewards": "11111111111111111111111111111111"}}}"#,
        )
        .unwrap();
        assert_eq!(
            settings.programs.overrides.get("mplxRewards").map(String::as_str),
            Some("11111111111111111111111111111111")
        );
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_settings_path("roundtrip");
        let mut settings = Settings::default();
        settings.rpc.url = "http://127.0.0.1:8899".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.rpc.url, "http://127.0.0.1:8899");
        assert_eq!(loaded.config_path(), Some(path.as_path()));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let path = temp_settings_path("missing");
        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.rpc.commitment, "confirmed");
        assert_eq!(settings.config_path(), Some(path.as_path()));
    }

    #[test]
    fn test_malformed_file() {
        let path = temp_settings_path("malformed");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            Settings::load_from(&path),
            Err(SettingsError::ParseError(_))
        ));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
