//! FillVault instruction
//!
//! Deposits reward tokens from a source token account into a pool's vault
//! and extends the pool's distribution window.
//!
//! Data layout (17 bytes, little-endian):
//!
//! ```text
//!  0..1:   discriminator          u8 = 1
//!  1..9:   amount                 u64
//!  9..17:  distribution_ends_at   u64 (unix ts)
//! ```
//!
//! Accounts:
//!
//! ```text
//!  0. [writable]  reward_pool
//!  1. []          reward_mint
//!  2. [writable]  vault
//!  3. [signer]    fill_authority
//!  4. [writable]  source_token_account
//!  5. []          token_program (defaults to SPL Token)
//! ```

use solana_program::instruction::{AccountMeta, Instruction};

use crate::codec::narrow_u64;
use crate::programs::{
    ProgramRegistry, MPLX_REWARDS_PROGRAM_NAME, SPL_TOKEN_ID, SPL_TOKEN_PROGRAM_NAME,
};
use crate::shared::{
    get_account_metas_and_signers, AccountValue, OptionalAccountStrategy, ResolvedAccount,
};
use crate::transaction::WrappedInstruction;
use crate::{Result, RewardsError};

/// Tag identifying FillVault among the program's instructions
pub const FILL_VAULT_DISCRIMINATOR: u8 = 1;

/// Encoded size of the instruction data
pub const FILL_VAULT_DATA_SIZE: usize = 17;

/// Decoded instruction data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillVaultInstructionData {
    pub discriminator: u8,
    pub amount: u64,
    pub distribution_ends_at: u64,
}

/// Caller-facing arguments, range-checked to `u64` on encode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FillVaultInstructionDataArgs {
    pub amount: u128,
    pub distribution_ends_at: u128,
}

impl FillVaultInstructionData {
    pub fn new(amount: u64, distribution_ends_at: u64) -> Self {
        Self {
            discriminator: FILL_VAULT_DISCRIMINATOR,
            amount,
            distribution_ends_at,
        }
    }

    pub fn serialize(&self) -> [u8; FILL_VAULT_DATA_SIZE] {
        let mut out = [0u8; FILL_VAULT_DATA_SIZE];
        out[0] = self.discriminator;
        out[1..9].copy_from_slice(&self.amount.to_le_bytes());
        out[9..17].copy_from_slice(&self.distribution_ends_at.to_le_bytes());
        out
    }

    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let bytes: &[u8; FILL_VAULT_DATA_SIZE] =
            data.try_into().map_err(|_| RewardsError::MalformedInstructionData {
                expected: FILL_VAULT_DATA_SIZE,
                actual: data.len(),
            })?;

        if bytes[0] != FILL_VAULT_DISCRIMINATOR {
            return Err(RewardsError::InvalidDiscriminator {
                expected: FILL_VAULT_DISCRIMINATOR,
                actual: bytes[0],
            });
        }

        let mut amount = [0u8; 8];
        amount.copy_from_slice(&bytes[1..9]);
        let mut ends_at = [0u8; 8];
        ends_at.copy_from_slice(&bytes[9..17]);

        Ok(Self::new(u64::from_le_bytes(amount), u64::from_le_bytes(ends_at)))
    }
}

impl TryFrom<FillVaultInstructionDataArgs> for FillVaultInstructionData {
    type Error = RewardsError;

    fn try_from(args: FillVaultInstructionDataArgs) -> Result<Self> {
        Ok(Self::new(
            narrow_u64("amount", args.amount)?,
            narrow_u64("distribution_ends_at", args.distribution_ends_at)?,
        ))
    }
}

/// Encode arguments with the discriminator prepended.
pub fn serialize_fill_vault_data(args: FillVaultInstructionDataArgs) -> Result<Vec<u8>> {
    Ok(FillVaultInstructionData::try_from(args)?.serialize().to_vec())
}

/// Builder for the `FillVault` instruction.
///
/// Accounts may be set in any order; the output always follows the fixed
/// account indices. `token_program` falls back to the registered SPL Token
/// program.
#[derive(Debug, Clone, Default)]
pub struct FillVaultBuilder {
    reward_pool: Option<AccountValue>,
    reward_mint: Option<AccountValue>,
    vault: Option<AccountValue>,
    fill_authority: Option<AccountValue>,
    source_token_account: Option<AccountValue>,
    token_program: Option<AccountValue>,
    amount: Option<u128>,
    distribution_ends_at: Option<u128>,
    remaining_accounts: Vec<AccountMeta>,
}

impl FillVaultBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The reward pool account
    pub fn reward_pool(&mut self, reward_pool: impl Into<AccountValue>) -> &mut Self {
        self.reward_pool = Some(reward_pool.into());
        self
    }

    /// Mint of the reward token
    pub fn reward_mint(&mut self, reward_mint: impl Into<AccountValue>) -> &mut Self {
        self.reward_mint = Some(reward_mint.into());
        self
    }

    /// The pool's reward vault
    pub fn vault(&mut self, vault: impl Into<AccountValue>) -> &mut Self {
        self.vault = Some(vault.into());
        self
    }

    /// Wallet allowed to fill the pool's vault; must be a signer
    pub fn fill_authority(&mut self, fill_authority: impl Into<AccountValue>) -> &mut Self {
        self.fill_authority = Some(fill_authority.into());
        self
    }

    /// Token account the rewards are taken from
    pub fn source_token_account(
        &mut self,
        source_token_account: impl Into<AccountValue>,
    ) -> &mut Self {
        self.source_token_account = Some(source_token_account.into());
        self
    }

    /// Token program of the reward mint
    pub fn token_program(&mut self, token_program: impl Into<AccountValue>) -> &mut Self {
        self.token_program = Some(token_program.into());
        self
    }

    pub fn amount(&mut self, amount: impl Into<u128>) -> &mut Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn distribution_ends_at(&mut self, distribution_ends_at: impl Into<u128>) -> &mut Self {
        self.distribution_ends_at = Some(distribution_ends_at.into());
        self
    }

    pub fn args(&mut self, args: FillVaultInstructionDataArgs) -> &mut Self {
        self.amount = Some(args.amount);
        self.distribution_ends_at = Some(args.distribution_ends_at);
        self
    }

    /// Extra account appended after the fixed ones
    pub fn add_remaining_account(&mut self, account: AccountMeta) -> &mut Self {
        self.remaining_accounts.push(account);
        self
    }

    pub fn add_remaining_accounts(&mut self, accounts: &[AccountMeta]) -> &mut Self {
        self.remaining_accounts.extend_from_slice(accounts);
        self
    }

    /// Resolve accounts against `programs` and encode the instruction.
    pub fn build(&self, programs: &ProgramRegistry) -> Result<WrappedInstruction> {
        let program_id = programs.resolve(MPLX_REWARDS_PROGRAM_NAME)?;

        let token_program = self.token_program.clone().unwrap_or_else(|| {
            programs
                .get_public_key(SPL_TOKEN_PROGRAM_NAME, SPL_TOKEN_ID)
                .into()
        });

        let resolved = [
            ResolvedAccount::new("reward_pool", 0, true, self.reward_pool.clone()),
            ResolvedAccount::new("reward_mint", 1, false, self.reward_mint.clone()),
            ResolvedAccount::new("vault", 2, true, self.vault.clone()),
            ResolvedAccount::new("fill_authority", 3, false, self.fill_authority.clone()).signer(),
            ResolvedAccount::new(
                "source_token_account",
                4,
                true,
                self.source_token_account.clone(),
            ),
            ResolvedAccount::new("token_program", 5, false, Some(token_program)),
        ];

        let (mut accounts, signers) = get_account_metas_and_signers(
            resolved,
            OptionalAccountStrategy::ProgramId,
            program_id,
        )?;
        accounts.extend_from_slice(&self.remaining_accounts);

        let data = serialize_fill_vault_data(FillVaultInstructionDataArgs {
            amount: self.amount.ok_or(RewardsError::MissingArgument("amount"))?,
            distribution_ends_at: self
                .distribution_ends_at
                .ok_or(RewardsError::MissingArgument("distribution_ends_at"))?,
        })?;

        Ok(WrappedInstruction {
            instruction: Instruction {
                program_id,
                accounts,
                data,
            },
            signers,
            bytes_created_on_chain: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::programs::{Program, MPLX_REWARDS_ID};
    use solana_program::pubkey::Pubkey;
    use solana_sdk::signature::{Keypair, Signer};
    use std::sync::Arc;

    struct Keys {
        reward_pool: Pubkey,
        reward_mint: Pubkey,
        vault: Pubkey,
        source: Pubkey,
        authority: Arc<Keypair>,
    }

    fn keys() -> Keys {
        Keys {
            reward_pool: Pubkey::new_unique(),
            reward_mint: Pubkey::new_unique(),
            vault: Pubkey::new_unique(),
            source: Pubkey::new_unique(),
            authority: Arc::new(Keypair::new()),
        }
    }

    fn builder(k: &Keys) -> FillVaultBuilder {
        let mut b = FillVaultBuilder::new();
        b.reward_pool(k.reward_pool)
            .reward_mint(k.reward_mint)
            .vault(k.vault)
            .fill_authority(AccountValue::Signer(k.authority.clone()))
            .source_token_account(k.source)
            .amount(1_000_000u64)
            .distribution_ends_at(1_700_000_000u64);
        b
    }

    #[test]
    fn test_data_layout() {
        let data = serialize_fill_vault_data(FillVaultInstructionDataArgs {
            amount: 1_000_000,
            distribution_ends_at: 1_700_000_000,
        })
        .unwrap();

        let mut expected = vec![1u8];
        expected.extend_from_slice(&1_000_000u64.to_le_bytes());
        expected.extend_from_slice(&1_700_000_000u64.to_le_bytes());
        assert_eq!(data, expected);
        assert_eq!(data.len(), FILL_VAULT_DATA_SIZE);
    }

    #[test]
    fn test_data_rejects_wide_amount() {
        let err = serialize_fill_vault_data(FillVaultInstructionDataArgs {
            amount: u64::MAX as u128 + 1,
            distribution_ends_at: 0,
        })
        .unwrap_err();
        assert!(matches!(err, RewardsError::ValueOutOfRange { field: "amount", .. }));
    }

    #[test]
    fn test_deserialize_checks_length_and_tag() {
        let data = FillVaultInstructionData::new(5, 6).serialize();
        assert_eq!(
            FillVaultInstructionData::deserialize(&data).unwrap(),
            FillVaultInstructionData::new(5, 6)
        );

        assert_eq!(
            FillVaultInstructionData::deserialize(&data[..16]).unwrap_err(),
            RewardsError::MalformedInstructionData {
                expected: 17,
                actual: 16
            }
        );

        let mut wrong_tag = data;
        wrong_tag[0] = 2;
        assert_eq!(
            FillVaultInstructionData::deserialize(&wrong_tag).unwrap_err(),
            RewardsError::InvalidDiscriminator {
                expected: 1,
                actual: 2
            }
        );
    }

    #[test]
    fn test_build_account_order_and_flags() {
        let k = keys();
        let ix = builder(&k).build(&ProgramRegistry::default()).unwrap();

        assert_eq!(ix.instruction.program_id, MPLX_REWARDS_ID);
        assert_eq!(
            ix.instruction.accounts,
            vec![
                AccountMeta::new(k.reward_pool, false),
                AccountMeta::new_readonly(k.reward_mint, false),
                AccountMeta::new(k.vault, false),
                AccountMeta::new_readonly(k.authority.pubkey(), true),
                AccountMeta::new(k.source, false),
                AccountMeta::new_readonly(SPL_TOKEN_ID, false),
            ]
        );
        assert_eq!(ix.signers.len(), 1);
        assert_eq!(ix.signers[0].pubkey(), k.authority.pubkey());
        assert_eq!(ix.bytes_created_on_chain, 0);
    }

    #[test]
    fn test_build_token_program_override() {
        let k = keys();
        let token_2022 = Pubkey::new_unique();
        let ix = builder(&k)
            .token_program(token_2022)
            .build(&ProgramRegistry::default())
            .unwrap();

        assert_eq!(ix.instruction.accounts[5].pubkey, token_2022);
    }

    #[test]
    fn test_build_token_program_from_registry() {
        let k = keys();
        let custom_token = Pubkey::new_unique();
        let mut programs = ProgramRegistry::default();
        programs.add(Program::new(SPL_TOKEN_PROGRAM_NAME, custom_token), true);

        let ix = builder(&k).build(&programs).unwrap();
        assert_eq!(ix.instruction.accounts[5].pubkey, custom_token);
    }

    #[test]
    fn test_build_unknown_program() {
        let k = keys();
        let err = builder(&k).build(&ProgramRegistry::new()).unwrap_err();
        assert_eq!(err, RewardsError::UnknownProgram("mplxRewards".to_string()));
    }

    #[test]
    fn test_build_fill_authority_without_signer() {
        let k = keys();
        let err = builder(&k)
            .fill_authority(k.authority.pubkey())
            .build(&ProgramRegistry::default())
            .unwrap_err();
        assert_eq!(err, RewardsError::MissingSigner("fill_authority"));
    }

    #[test]
    fn test_build_missing_account_and_argument() {
        let k = keys();
        let mut b = FillVaultBuilder::new();
        b.reward_mint(k.reward_mint)
            .vault(k.vault)
            .fill_authority(AccountValue::Signer(k.authority.clone()))
            .source_token_account(k.source)
            .amount(1u64)
            .distribution_ends_at(2u64);
        assert_eq!(
            b.build(&ProgramRegistry::default()).unwrap_err(),
            RewardsError::MissingAccount("reward_pool")
        );

        let mut b = builder(&k);
        b.distribution_ends_at = None;
        assert_eq!(
            b.build(&ProgramRegistry::default()).unwrap_err(),
            RewardsError::MissingArgument("distribution_ends_at")
        );
    }

    #[test]
    fn test_build_appends_remaining_accounts() {
        let k = keys();
        let extra = AccountMeta::new_readonly(Pubkey::new_unique(), false);
        let ix = builder(&k)
            .add_remaining_account(extra.clone())
            .build(&ProgramRegistry::default())
            .unwrap();

        assert_eq!(ix.instruction.accounts.len(), 7);
        assert_eq!(ix.instruction.accounts[6], extra);
    }
}
