//! Program-derived addresses of the rewards program.

use solana_program::pubkey::{Pubkey, PubkeyError};

pub const REWARD_POOL_SEED: &[u8] = b"reward_pool";
pub const VAULT_SEED: &[u8] = b"vault";

/// Reward pool owned by a deposit/fill authority pair.
pub fn find_reward_pool_address(
    deposit_authority: &Pubkey,
    fill_authority: &Pubkey,
    program_id: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            REWARD_POOL_SEED,
            deposit_authority.as_ref(),
            fill_authority.as_ref(),
        ],
        program_id,
    )
}

/// Token vault of a pool for a given reward mint. The bump is the value
/// stored as `token_account_bump` on the pool.
pub fn find_vault_address(
    reward_pool: &Pubkey,
    reward_mint: &Pubkey,
    program_id: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[VAULT_SEED, reward_pool.as_ref(), reward_mint.as_ref()],
        program_id,
    )
}

/// Recreate the vault address from a known bump.
pub fn create_vault_address(
    reward_pool: &Pubkey,
    reward_mint: &Pubkey,
    bump: u8,
    program_id: &Pubkey,
) -> Result<Pubkey, PubkeyError> {
    Pubkey::create_program_address(
        &[VAULT_SEED, reward_pool.as_ref(), reward_mint.as_ref(), &[bump]],
        program_id,
    )
}
