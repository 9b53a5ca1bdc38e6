use solana_program::pubkey::Pubkey;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewardsError {
    #[error("Malformed account: expected {expected} bytes, got {actual}")]
    MalformedAccount { expected: usize, actual: usize },

    #[error("Value out of range for {field}: {value} exceeds {max}")]
    ValueOutOfRange {
        field: &'static str,
        value: u128,
        max: u128,
    },

    #[error("Missing signer for account: {0}")]
    MissingSigner(&'static str),

    #[error("Missing account: {0}")]
    MissingAccount(&'static str),

    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("Unknown program: {0}")]
    UnknownProgram(String),

    #[error("Account [{name}] not found at address [{address}]")]
    AccountNotFound { name: &'static str, address: Pubkey },

    #[error("Malformed instruction data: expected {expected} bytes, got {actual}")]
    MalformedInstructionData { expected: usize, actual: usize },

    #[error("Invalid discriminator: expected {expected}, got {actual}")]
    InvalidDiscriminator { expected: u8, actual: u8 },
}

pub type Result<T> = std::result::Result<T, RewardsError>;
