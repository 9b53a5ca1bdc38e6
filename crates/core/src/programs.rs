//! Program registry
//!
//! Maps symbolic program names to addresses. Instruction builders resolve
//! their target program through a registry so deployments on other
//! clusters can be swapped in without touching the builders.

use solana_program::pubkey::Pubkey;

use crate::{Result, RewardsError};

/// Registry name of the rewards program
pub const MPLX_REWARDS_PROGRAM_NAME: &str = "mplxRewards";

/// Rewards program ID
pub const MPLX_REWARDS_ID: Pubkey =
    solana_program::pubkey!("BF5PatmRTQDgEKoXR7iHRbkibEEi83nVM38cUKWzQcTR");

/// Registry name of the SPL Token program
pub const SPL_TOKEN_PROGRAM_NAME: &str = "splToken";

/// SPL Token program ID
pub const SPL_TOKEN_ID: Pubkey =
    solana_program::pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// A named program address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub name: String,
    pub public_key: Pubkey,
}

impl Program {
    pub fn new(name: impl Into<String>, public_key: Pubkey) -> Self {
        Self {
            name: name.into(),
            public_key,
        }
    }
}

/// Name -> address lookup used by instruction builders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramRegistry {
    programs: Vec<Program>,
}

impl Default for ProgramRegistry {
    /// A registry with the rewards plugin already installed
    fn default() -> Self {
        let mut registry = Self::new();
        RewardsPlugin.install(&mut registry);
        registry
    }
}

impl ProgramRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            programs: Vec::new(),
        }
    }

    /// Register a program. An existing entry with the same name is only
    /// replaced when `overrides` is set.
    pub fn add(&mut self, program: Program, overrides: bool) {
        match self.programs.iter_mut().find(|p| p.name == program.name) {
            Some(existing) if overrides => *existing = program,
            Some(_) => {}
            None => self.programs.push(program),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Program> {
        self.programs.iter().find(|p| p.name == name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Address registered under `name`, or `fallback`
    pub fn get_public_key(&self, name: &str, fallback: Pubkey) -> Pubkey {
        self.get(name).map(|p| p.public_key).unwrap_or(fallback)
    }

    /// Address registered under `name`; fails if nothing is registered.
    pub fn resolve(&self, name: &str) -> Result<Pubkey> {
        self.get(name)
            .map(|p| p.public_key)
            .ok_or_else(|| RewardsError::UnknownProgram(name.to_string()))
    }

    pub fn all(&self) -> &[Program] {
        &self.programs
    }
}

/// Installs programs into a registry
pub trait Plugin {
    fn install(&self, registry: &mut ProgramRegistry);
}

/// Registers the rewards program and the token program it depends on.
/// Existing entries are left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct RewardsPlugin;

impl Plugin for RewardsPlugin {
    fn install(&self, registry: &mut ProgramRegistry) {
        registry.add(Program::new(MPLX_REWARDS_PROGRAM_NAME, MPLX_REWARDS_ID), false);
        registry.add(Program::new(SPL_TOKEN_PROGRAM_NAME, SPL_TOKEN_ID), false);
    }
}
