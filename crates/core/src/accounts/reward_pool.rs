//! RewardPool account codec
//!
//! Fixed 176-byte layout owned by the rewards program:
//!
//! ```text
//!   0..32:   deposit_authority                  Pubkey
//!  32..64:   distribute_authority               Pubkey
//!  64..96:   fill_authority                     Pubkey
//!  96..128:  reward_mint                        Pubkey
//! 128..144:  index_with_precision               u128
//! 144..152:  total_share                        u64
//! 152..160:  distribution_ends_at               u64 (unix ts)
//! 160..168:  tokens_available_for_distribution  u64
//! 168..169:  token_account_bump                 u8
//! 169..176:  data                               [u8; 7] reserved
//! ```
//!
//! All integers are little-endian. Changing this table requires a program
//! version bump on-chain.

use solana_program::pubkey::Pubkey;

use crate::account::{Account, RawAccount};
use crate::codec::{narrow_u64, narrow_u8, read_array};
use crate::{Result, RewardsError};

/// Encoded size of a RewardPool account
pub const REWARD_POOL_SIZE: usize = 176;

/// Account type name used in not-found errors
pub const REWARD_POOL_ACCOUNT_NAME: &str = "RewardPool";

/// Size accessor for callers that validate buffers before a fetch.
pub fn get_reward_pool_size() -> usize {
    REWARD_POOL_SIZE
}

/// Fields of the RewardPool layout, in on-chain order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RewardPoolField {
    DepositAuthority,
    DistributeAuthority,
    FillAuthority,
    RewardMint,
    IndexWithPrecision,
    TotalShare,
    DistributionEndsAt,
    TokensAvailableForDistribution,
    TokenAccountBump,
    Data,
}

impl RewardPoolField {
    pub const ALL: [RewardPoolField; 10] = [
        Self::DepositAuthority,
        Self::DistributeAuthority,
        Self::FillAuthority,
        Self::RewardMint,
        Self::IndexWithPrecision,
        Self::TotalShare,
        Self::DistributionEndsAt,
        Self::TokensAvailableForDistribution,
        Self::TokenAccountBump,
        Self::Data,
    ];

    /// Byte offset of the field from the start of the account data
    pub const fn offset(&self) -> usize {
        match self {
            Self::DepositAuthority => 0,
            Self::DistributeAuthority => 32,
            Self::FillAuthority => 64,
            Self::RewardMint => 96,
            Self::IndexWithPrecision => 128,
            Self::TotalShare => 144,
            Self::DistributionEndsAt => 152,
            Self::TokensAvailableForDistribution => 160,
            Self::TokenAccountBump => 168,
            Self::Data => 169,
        }
    }

    /// Width of the field in bytes
    pub const fn size(&self) -> usize {
        match self {
            Self::DepositAuthority
            | Self::DistributeAuthority
            | Self::FillAuthority
            | Self::RewardMint => 32,
            Self::IndexWithPrecision => 16,
            Self::TotalShare
            | Self::DistributionEndsAt
            | Self::TokensAvailableForDistribution => 8,
            Self::TokenAccountBump => 1,
            Self::Data => 7,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::DepositAuthority => "deposit_authority",
            Self::DistributeAuthority => "distribute_authority",
            Self::FillAuthority => "fill_authority",
            Self::RewardMint => "reward_mint",
            Self::IndexWithPrecision => "index_with_precision",
            Self::TotalShare => "total_share",
            Self::DistributionEndsAt => "distribution_ends_at",
            Self::TokensAvailableForDistribution => "tokens_available_for_distribution",
            Self::TokenAccountBump => "token_account_bump",
            Self::Data => "data",
        }
    }
}

/// Decoded RewardPool state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RewardPoolAccountData {
    /// Authority allowed to deposit stakes into minings
    pub deposit_authority: Pubkey,
    /// Authority allowed to trigger distributions
    pub distribute_authority: Pubkey,
    /// Authority allowed to fill the vault with rewards
    pub fill_authority: Pubkey,
    /// Mint of the reward token
    pub reward_mint: Pubkey,
    /// Cumulative reward index scaled by the program's precision
    pub index_with_precision: u128,
    /// Total weighted stake
    pub total_share: u64,
    /// Unix timestamp at which the current distribution ends
    pub distribution_ends_at: u64,
    /// Vault balance not yet distributed
    pub tokens_available_for_distribution: u64,
    /// Bump seed of the vault PDA
    pub token_account_bump: u8,
    /// Reserved
    pub data: [u8; 7],
}

/// Encoder input. Integer fields are taken as `u128` and range-checked
/// against their on-chain width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RewardPoolAccountDataArgs {
    pub deposit_authority: Pubkey,
    pub distribute_authority: Pubkey,
    pub fill_authority: Pubkey,
    pub reward_mint: Pubkey,
    pub index_with_precision: u128,
    pub total_share: u128,
    pub distribution_ends_at: u128,
    pub tokens_available_for_distribution: u128,
    pub token_account_bump: u128,
    pub data: [u8; 7],
}

impl From<RewardPoolAccountData> for RewardPoolAccountDataArgs {
    fn from(value: RewardPoolAccountData) -> Self {
        Self {
            deposit_authority: value.deposit_authority,
            distribute_authority: value.distribute_authority,
            fill_authority: value.fill_authority,
            reward_mint: value.reward_mint,
            index_with_precision: value.index_with_precision,
            total_share: value.total_share.into(),
            distribution_ends_at: value.distribution_ends_at.into(),
            tokens_available_for_distribution: value.tokens_available_for_distribution.into(),
            token_account_bump: value.token_account_bump.into(),
            data: value.data,
        }
    }
}

impl RewardPoolAccountData {
    /// Decode from exactly `REWARD_POOL_SIZE` bytes.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        if data.len() != REWARD_POOL_SIZE {
            return Err(RewardsError::MalformedAccount {
                expected: REWARD_POOL_SIZE,
                actual: data.len(),
            });
        }

        let pubkey = |field: RewardPoolField| -> Result<Pubkey> {
            read_array::<32>(data, field.offset(), REWARD_POOL_SIZE).map(Pubkey::new_from_array)
        };
        let u64_at = |field: RewardPoolField| -> Result<u64> {
            read_array::<8>(data, field.offset(), REWARD_POOL_SIZE).map(u64::from_le_bytes)
        };

        Ok(Self {
            deposit_authority: pubkey(RewardPoolField::DepositAuthority)?,
            distribute_authority: pubkey(RewardPoolField::DistributeAuthority)?,
            fill_authority: pubkey(RewardPoolField::FillAuthority)?,
            reward_mint: pubkey(RewardPoolField::RewardMint)?,
            index_with_precision: u128::from_le_bytes(read_array::<16>(
                data,
                RewardPoolField::IndexWithPrecision.offset(),
                REWARD_POOL_SIZE,
            )?),
            total_share: u64_at(RewardPoolField::TotalShare)?,
            distribution_ends_at: u64_at(RewardPoolField::DistributionEndsAt)?,
            tokens_available_for_distribution: u64_at(
                RewardPoolField::TokensAvailableForDistribution,
            )?,
            token_account_bump: data[RewardPoolField::TokenAccountBump.offset()],
            data: read_array::<7>(data, RewardPoolField::Data.offset(), REWARD_POOL_SIZE)?,
        })
    }

    /// Encode into the fixed layout. Infallible since every field already
    /// has its on-chain width.
    pub fn serialize(&self) -> [u8; REWARD_POOL_SIZE] {
        let mut out = [0u8; REWARD_POOL_SIZE];
        let mut put = |field: RewardPoolField, bytes: &[u8]| {
            let start = field.offset();
            out[start..start + field.size()].copy_from_slice(bytes);
        };

        put(RewardPoolField::DepositAuthority, self.deposit_authority.as_ref());
        put(RewardPoolField::DistributeAuthority, self.distribute_authority.as_ref());
        put(RewardPoolField::FillAuthority, self.fill_authority.as_ref());
        put(RewardPoolField::RewardMint, self.reward_mint.as_ref());
        put(RewardPoolField::IndexWithPrecision, &self.index_with_precision.to_le_bytes());
        put(RewardPoolField::TotalShare, &self.total_share.to_le_bytes());
        put(RewardPoolField::DistributionEndsAt, &self.distribution_ends_at.to_le_bytes());
        put(
            RewardPoolField::TokensAvailableForDistribution,
            &self.tokens_available_for_distribution.to_le_bytes(),
        );
        put(RewardPoolField::TokenAccountBump, &[self.token_account_bump]);
        put(RewardPoolField::Data, &self.data);

        out
    }
}

impl TryFrom<RewardPoolAccountDataArgs> for RewardPoolAccountData {
    type Error = RewardsError;

    fn try_from(args: RewardPoolAccountDataArgs) -> Result<Self> {
        Ok(Self {
            deposit_authority: args.deposit_authority,
            distribute_authority: args.distribute_authority,
            fill_authority: args.fill_authority,
            reward_mint: args.reward_mint,
            index_with_precision: args.index_with_precision,
            total_share: narrow_u64(RewardPoolField::TotalShare.name(), args.total_share)?,
            distribution_ends_at: narrow_u64(
                RewardPoolField::DistributionEndsAt.name(),
                args.distribution_ends_at,
            )?,
            tokens_available_for_distribution: narrow_u64(
                RewardPoolField::TokensAvailableForDistribution.name(),
                args.tokens_available_for_distribution,
            )?,
            token_account_bump: narrow_u8(
                RewardPoolField::TokenAccountBump.name(),
                args.token_account_bump,
            )?,
            data: args.data,
        })
    }
}

/// Encode caller-supplied args, rejecting integers wider than their field.
pub fn serialize_reward_pool(args: RewardPoolAccountDataArgs) -> Result<Vec<u8>> {
    let data = RewardPoolAccountData::try_from(args)?;
    Ok(data.serialize().to_vec())
}

/// Decoded RewardPool account with its header
pub type RewardPool = Account<RewardPoolAccountData>;

/// Decode a fetched account into a `RewardPool`.
pub fn deserialize_reward_pool(raw: &RawAccount) -> Result<RewardPool> {
    Ok(Account {
        header: raw.header,
        data: RewardPoolAccountData::deserialize(&raw.data)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RewardPoolAccountData {
        RewardPoolAccountData {
            deposit_authority: Pubkey::new_from_array([1u8; 32]),
            distribute_authority: Pubkey::new_from_array([2u8; 32]),
            fill_authority: Pubkey::new_from_array([3u8; 32]),
            reward_mint: Pubkey::new_from_array([4u8; 32]),
            index_with_precision: 10_000_000_000_000_000 * 42,
            total_share: 1_500,
            distribution_ends_at: 1_700_000_000,
            tokens_available_for_distribution: 9_000_000,
            token_account_bump: 254,
            data: [0u8; 7],
        }
    }

    #[test]
    fn test_size_constant() {
        assert_eq!(get_reward_pool_size(), 176);
        let last = RewardPoolField::Data;
        assert_eq!(last.offset() + last.size(), REWARD_POOL_SIZE);
    }

    #[test]
    fn test_fields_are_contiguous() {
        let mut expected_offset = 0;
        for field in RewardPoolField::ALL {
            assert_eq!(field.offset(), expected_offset, "{}", field.name());
            expected_offset += field.size();
        }
        assert_eq!(expected_offset, REWARD_POOL_SIZE);
    }

    #[test]
    fn test_serialize_places_fields_at_offsets() {
        let bytes = sample().serialize();

        assert_eq!(&bytes[0..32], &[1u8; 32]);
        assert_eq!(&bytes[64..96], &[3u8; 32]);
        assert_eq!(&bytes[144..152], &1_500u64.to_le_bytes());
        assert_eq!(&bytes[152..160], &1_700_000_000u64.to_le_bytes());
        assert_eq!(bytes[168], 254);
        assert_eq!(&bytes[169..176], &[0u8; 7]);
    }

    #[test]
    fn test_deserialize_roundtrip() {
        let pool = sample();
        let decoded = RewardPoolAccountData::deserialize(&pool.serialize()).unwrap();
        assert_eq!(decoded, pool);
    }

    #[test]
    fn test_deserialize_wrong_length() {
        let err = RewardPoolAccountData::deserialize(&[0u8; 175]).unwrap_err();
        assert_eq!(
            err,
            RewardsError::MalformedAccount {
                expected: 176,
                actual: 175
            }
        );

        // Trailing bytes are rejected too
        assert!(RewardPoolAccountData::deserialize(&[0u8; 177]).is_err());
        assert!(RewardPoolAccountData::deserialize(&[]).is_err());
    }

    #[test]
    fn test_serialize_args_accepts_max_widths() {
        let args = RewardPoolAccountDataArgs {
            index_with_precision: u128::MAX,
            total_share: u64::MAX as u128,
            distribution_ends_at: u64::MAX as u128,
            tokens_available_for_distribution: u64::MAX as u128,
            token_account_bump: 255,
            ..Default::default()
        };

        let bytes = serialize_reward_pool(args).unwrap();
        assert_eq!(bytes.len(), REWARD_POOL_SIZE);

        let decoded = RewardPoolAccountData::deserialize(&bytes).unwrap();
        assert_eq!(decoded.index_with_precision, u128::MAX);
        assert_eq!(decoded.total_share, u64::MAX);
        assert_eq!(decoded.token_account_bump, 255);
    }

    #[test]
    fn test_serialize_args_rejects_bump_overflow() {
        let args = RewardPoolAccountDataArgs {
            token_account_bump: 256,
            ..RewardPoolAccountDataArgs::from(sample())
        };

        let err = serialize_reward_pool(args).unwrap_err();
        assert_eq!(
            err,
            RewardsError::ValueOutOfRange {
                field: "token_account_bump",
                value: 256,
                max: 255
            }
        );
    }

    #[test]
    fn test_serialize_args_rejects_u64_overflow() {
        let args = RewardPoolAccountDataArgs {
            tokens_available_for_distribution: u64::MAX as u128 + 1,
            ..Default::default()
        };

        assert!(matches!(
            serialize_reward_pool(args),
            Err(RewardsError::ValueOutOfRange {
                field: "tokens_available_for_distribution",
                ..
            })
        ));
    }

    #[test]
    fn test_deserialize_reward_pool_keeps_header() {
        let address = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let raw = RawAccount::new(address, owner, 2_039_280, sample().serialize().to_vec());

        let pool = deserialize_reward_pool(&raw).unwrap();
        assert_eq!(pool.address(), address);
        assert_eq!(pool.header.owner, owner);
        assert_eq!(pool.header.lamports, 2_039_280);
        assert_eq!(pool.data, sample());
    }
}
