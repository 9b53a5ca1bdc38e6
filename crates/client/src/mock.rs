//! In-memory account store and the simulated fill-vault processor.

use std::collections::HashMap;

use solana_program::instruction::Instruction;
use solana_program::pubkey::Pubkey;
use solana_sdk::signature::Signature;

use mplx_rewards_core::accounts::{RewardPoolAccountData, REWARD_POOL_ACCOUNT_NAME};
use mplx_rewards_core::instructions::FillVaultInstructionData;
use mplx_rewards_core::pda::create_vault_address;
use mplx_rewards_core::{RawAccount, RewardsError};

use crate::{ClientError, Result};

pub(crate) const SECONDS_PER_DAY: u64 = 86_400;

/// In-memory state for mock mode
#[derive(Debug, Default)]
pub(crate) struct MockState {
    /// Accounts by address
    pub accounts: HashMap<Pubkey, RawAccount>,
    /// Transaction counter for generating mock signatures
    pub tx_counter: u64,
    /// Pinned unix time; wall clock when unset
    pub clock: Option<u64>,
}

impl MockState {
    pub fn next_signature(&mut self) -> Signature {
        self.tx_counter += 1;
        let mut sig = [0u8; 64];
        sig[0..8].copy_from_slice(&self.tx_counter.to_le_bytes());
        sig[8..16].copy_from_slice(b"mocktxn!");
        Signature::from(sig)
    }

    pub fn now(&self) -> u64 {
        self.clock.unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default()
        })
    }
}

/// Start of the UTC day containing `ts`
pub(crate) fn day_start(ts: u64) -> u64 {
    ts - ts % SECONDS_PER_DAY
}

/// Apply one FillVault instruction to `accounts`.
///
/// Account positions: 0 pool, 1 mint, 2 vault, 3 fill authority. The token
/// transfer itself is not modelled; only the pool state changes.
pub(crate) fn process_fill_vault(
    accounts: &mut HashMap<Pubkey, RawAccount>,
    program_id: &Pubkey,
    ix: &Instruction,
    now: u64,
) -> Result<()> {
    let data = FillVaultInstructionData::deserialize(&ix.data)?;

    let key_at = |index: usize, name: &'static str| {
        ix.accounts
            .get(index)
            .ok_or(RewardsError::MissingAccount(name))
    };
    let pool_key = key_at(0, "reward_pool")?.pubkey;
    let mint_key = key_at(1, "reward_mint")?.pubkey;
    let vault_key = key_at(2, "vault")?.pubkey;
    let authority = key_at(3, "fill_authority")?;
    if !authority.is_signer {
        return Err(RewardsError::MissingSigner("fill_authority").into());
    }

    let raw = accounts
        .get_mut(&pool_key)
        .ok_or(RewardsError::AccountNotFound {
            name: REWARD_POOL_ACCOUNT_NAME,
            address: pool_key,
        })?;
    let mut pool = RewardPoolAccountData::deserialize(&raw.data)?;

    if pool.fill_authority != authority.pubkey {
        return Err(ClientError::NotAuthorized);
    }

    let expected_vault =
        create_vault_address(&pool_key, &mint_key, pool.token_account_bump, program_id)
            .map_err(|_| ClientError::InvalidVault)?;
    if expected_vault != vault_key {
        return Err(ClientError::InvalidVault);
    }

    let ends_day_start = day_start(data.distribution_ends_at);
    if ends_day_start < day_start(now) {
        return Err(ClientError::DistributionInThePast);
    }

    // the end of distribution only moves forward
    if ends_day_start < pool.distribution_ends_at {
        return Err(ClientError::MathOverflow);
    }
    pool.distribution_ends_at = ends_day_start;
    pool.tokens_available_for_distribution = pool
        .tokens_available_for_distribution
        .checked_add(data.amount)
        .ok_or(ClientError::MathOverflow)?;

    raw.data = pool.serialize().to_vec();
    Ok(())
}
