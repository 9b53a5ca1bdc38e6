//! Client configuration

use std::collections::HashMap;

use solana_program::pubkey::Pubkey;
use solana_sdk::commitment_config::CommitmentConfig;

use mplx_rewards_core::{Program, ProgramRegistry};

/// Client mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMode {
    /// In-memory accounts, no cluster. Fill-vault is simulated locally.
    Mock,
    /// Real Solana RPC
    Live,
}

/// Rewards client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Client mode (Mock or Live)
    pub mode: ClientMode,
    /// Solana RPC endpoint (only used in Live mode)
    pub rpc_url: String,
    /// Commitment level for reads and transactions
    pub commitment: String,
    /// Program addresses replacing the defaults, keyed by registry name
    pub program_overrides: HashMap<String, Pubkey>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            mode: ClientMode::Mock,
            rpc_url: "https://api.devnet.solana.com".to_string(),
            commitment: "confirmed".to_string(),
            program_overrides: HashMap::new(),
        }
    }
}

impl ClientConfig {
    /// Create a mock configuration for development
    pub fn mock() -> Self {
        Self {
            mode: ClientMode::Mock,
            ..Default::default()
        }
    }

    /// Create a live configuration for Solana devnet
    pub fn devnet() -> Self {
        Self {
            mode: ClientMode::Live,
            rpc_url: "https://api.devnet.solana.com".to_string(),
            ..Default::default()
        }
    }

    /// Create a live configuration for Solana mainnet
    pub fn mainnet() -> Self {
        Self {
            mode: ClientMode::Live,
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            commitment: "finalized".to_string(),
            ..Default::default()
        }
    }

    /// Create a live configuration for a local test validator
    pub fn localnet() -> Self {
        Self {
            mode: ClientMode::Live,
            rpc_url: "http://127.0.0.1:8899".to_string(),
            commitment: "processed".to_string(),
            ..Default::default()
        }
    }

    /// Register a program address under `name`, replacing the default.
    pub fn with_program(mut self, name: impl Into<String>, address: Pubkey) -> Self {
        self.program_overrides.insert(name.into(), address);
        self
    }

    /// Get commitment config for Solana client
    pub fn commitment_config(&self) -> CommitmentConfig {
        match self.commitment.as_str() {
            "finalized" => CommitmentConfig::finalized(),
            "confirmed" => CommitmentConfig::confirmed(),
            "processed" => CommitmentConfig::processed(),
            _ => CommitmentConfig::confirmed(),
        }
    }

    /// Default registry with the configured overrides applied
    pub fn program_registry(&self) -> ProgramRegistry {
        let mut registry = ProgramRegistry::default();
        for (name, address) in &self.program_overrides {
            registry.add(Program::new(name.clone(), *address), true);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mplx_rewards_core::{
        MPLX_REWARDS_ID, MPLX_REWARDS_PROGRAM_NAME, SPL_TOKEN_ID, SPL_TOKEN_PROGRAM_NAME,
    };

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(config.rpc_url.contains("solana"));
        assert_eq!(config.commitment, "confirmed");
        assert_eq!(config.mode, ClientMode::Mock);
        assert!(config.program_overrides.is_empty());
    }

    #[test]
    fn test_live_presets() {
        assert_eq!(ClientConfig::devnet().mode, ClientMode::Live);
        assert_eq!(ClientConfig::mainnet().commitment, "finalized");
        assert!(ClientConfig::localnet().rpc_url.starts_with("http://127.0.0.1"));
    }

    #[test]
    fn test_commitment_fallback() {
        let mut config = ClientConfig::mock();
        config.commitment = "finalized".to_string();
        assert_eq!(config.commitment_config(), CommitmentConfig::finalized());

        config.commitment = "bogus".to_string();
        assert_eq!(config.commitment_config(), CommitmentConfig::confirmed());
    }

    #[test]
    fn test_program_overrides_replace_defaults() {
        let custom = Pubkey::new_unique();
        let registry = ClientConfig::mock()
            .with_program(MPLX_REWARDS_PROGRAM_NAME, custom)
            .program_registry();

        assert_eq!(registry.resolve(MPLX_REWARDS_PROGRAM_NAME).unwrap(), custom);
        assert_eq!(registry.resolve(SPL_TOKEN_PROGRAM_NAME).unwrap(), SPL_TOKEN_ID);
        assert_ne!(custom, MPLX_REWARDS_ID);
    }
}
