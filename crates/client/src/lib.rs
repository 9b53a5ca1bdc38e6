//! MPL Rewards Client
//!
//! Async access to the rewards program over Solana RPC.
//!
//! ## Flow
//!
//! 1. **Fetch**: raw account bytes are read by address and decoded into
//!    `RewardPool`s. Strict fetches fail on a missing account, safe fetches
//!    return `None` instead.
//! 2. **Scan**: `RewardPoolGpaBuilder` filters become `getProgramAccounts`
//!    filters; every match is decoded.
//! 3. **Fill**: a `FillVaultBuilder` is resolved against the client's
//!    program registry, signed by the payer plus the builder's signers and
//!    submitted.
//!
//! In mock mode accounts live in memory and fill-vault is applied locally
//! with the same checks the program performs.

mod client;
mod config;
mod mock;

pub use client::RewardsClient;
pub use config::{ClientConfig, ClientMode};

use mplx_rewards_core::RewardsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Not authorized")]
    NotAuthorized,

    #[error("Invalid vault")]
    InvalidVault,

    #[error("Distribution ends in the past")]
    DistributionInThePast,

    #[error("Math overflow")]
    MathOverflow,

    #[error("Only available in mock mode")]
    MockOnly,

    #[error(transparent)]
    Rewards(#[from] RewardsError),
}

pub type Result<T> = std::result::Result<T, ClientError>;
