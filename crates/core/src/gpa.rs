//! Filtered scans over the rewards program's accounts
//!
//! Filters are plain data here; the client turns them into RPC filters for
//! a live `getProgramAccounts` call or evaluates them locally in mock mode.

use solana_program::pubkey::Pubkey;

use crate::accounts::{RewardPoolField, REWARD_POOL_SIZE};
use crate::programs::{ProgramRegistry, MPLX_REWARDS_ID, MPLX_REWARDS_PROGRAM_NAME};

/// A single account filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountFilter {
    /// Account data length must equal this value
    DataSize(u64),
    /// Bytes at `offset` must equal `bytes`
    Memcmp { offset: usize, bytes: Vec<u8> },
}

impl AccountFilter {
    pub fn matches(&self, data: &[u8]) -> bool {
        match self {
            Self::DataSize(size) => data.len() as u64 == *size,
            Self::Memcmp { offset, bytes } => data
                .get(*offset..offset + bytes.len())
                .is_some_and(|window| window == bytes.as_slice()),
        }
    }
}

/// Equality value for one RewardPool field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardPoolFieldValue {
    DepositAuthority(Pubkey),
    DistributeAuthority(Pubkey),
    FillAuthority(Pubkey),
    RewardMint(Pubkey),
    IndexWithPrecision(u128),
    TotalShare(u64),
    DistributionEndsAt(u64),
    TokensAvailableForDistribution(u64),
    TokenAccountBump(u8),
    Data([u8; 7]),
}

impl RewardPoolFieldValue {
    pub fn field(&self) -> RewardPoolField {
        match self {
            Self::DepositAuthority(_) => RewardPoolField::DepositAuthority,
            Self::DistributeAuthority(_) => RewardPoolField::DistributeAuthority,
            Self::FillAuthority(_) => RewardPoolField::FillAuthority,
            Self::RewardMint(_) => RewardPoolField::RewardMint,
            Self::IndexWithPrecision(_) => RewardPoolField::IndexWithPrecision,
            Self::TotalShare(_) => RewardPoolField::TotalShare,
            Self::DistributionEndsAt(_) => RewardPoolField::DistributionEndsAt,
            Self::TokensAvailableForDistribution(_) => {
                RewardPoolField::TokensAvailableForDistribution
            }
            Self::TokenAccountBump(_) => RewardPoolField::TokenAccountBump,
            Self::Data(_) => RewardPoolField::Data,
        }
    }

    /// Field value encoded exactly as it sits in the account
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::DepositAuthority(key)
            | Self::DistributeAuthority(key)
            | Self::FillAuthority(key)
            | Self::RewardMint(key) => key.to_bytes().to_vec(),
            Self::IndexWithPrecision(v) => v.to_le_bytes().to_vec(),
            Self::TotalShare(v)
            | Self::DistributionEndsAt(v)
            | Self::TokensAvailableForDistribution(v) => v.to_le_bytes().to_vec(),
            Self::TokenAccountBump(v) => vec![*v],
            Self::Data(v) => v.to_vec(),
        }
    }

    pub fn to_filter(&self) -> AccountFilter {
        AccountFilter::Memcmp {
            offset: self.field().offset(),
            bytes: self.to_bytes(),
        }
    }
}

/// Collects filters for a RewardPool scan. A data-size filter for the
/// fixed layout is always included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardPoolGpaBuilder {
    program_id: Pubkey,
    filters: Vec<AccountFilter>,
}

impl RewardPoolGpaBuilder {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            filters: vec![AccountFilter::DataSize(REWARD_POOL_SIZE as u64)],
        }
    }

    /// Builder bound to the rewards program registered in `programs`,
    /// falling back to the well-known address.
    pub fn from_registry(programs: &ProgramRegistry) -> Self {
        Self::new(programs.get_public_key(MPLX_REWARDS_PROGRAM_NAME, MPLX_REWARDS_ID))
    }

    pub fn where_field(mut self, value: RewardPoolFieldValue) -> Self {
        self.filters.push(value.to_filter());
        self
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    pub fn filters(&self) -> &[AccountFilter] {
        &self.filters
    }

    /// Whether raw account data passes every filter
    pub fn matches(&self, data: &[u8]) -> bool {
        self.filters.iter().all(|f| f.matches(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::RewardPoolAccountData;

    #[test]
    fn test_builder_always_filters_size() {
        let builder = RewardPoolGpaBuilder::new(MPLX_REWARDS_ID);
        assert_eq!(builder.filters(), &[AccountFilter::DataSize(176)]);
        assert!(builder.matches(&[0u8; 176]));
        assert!(!builder.matches(&[0u8; 175]));
    }

    #[test]
    fn test_where_field_uses_layout_offset() {
        let fill_authority = Pubkey::new_unique();
        let builder = RewardPoolGpaBuilder::new(MPLX_REWARDS_ID)
            .where_field(RewardPoolFieldValue::FillAuthority(fill_authority));

        assert_eq!(
            builder.filters()[1],
            AccountFilter::Memcmp {
                offset: 64,
                bytes: fill_authority.to_bytes().to_vec()
            }
        );
    }

    #[test]
    fn test_matches_encoded_pool() {
        let pool = RewardPoolAccountData {
            reward_mint: Pubkey::new_unique(),
            total_share: 77,
            token_account_bump: 9,
            ..Default::default()
        };
        let bytes = pool.serialize();

        let hit = RewardPoolGpaBuilder::new(MPLX_REWARDS_ID)
            .where_field(RewardPoolFieldValue::RewardMint(pool.reward_mint))
            .where_field(RewardPoolFieldValue::TotalShare(77))
            .where_field(RewardPoolFieldValue::TokenAccountBump(9));
        assert!(hit.matches(&bytes));

        let miss = RewardPoolGpaBuilder::new(MPLX_REWARDS_ID)
            .where_field(RewardPoolFieldValue::TotalShare(78));
        assert!(!miss.matches(&bytes));
    }

    #[test]
    fn test_memcmp_past_end_does_not_match() {
        let filter = AccountFilter::Memcmp {
            offset: 170,
            bytes: vec![0u8; 8],
        };
        assert!(!filter.matches(&[0u8; 176]));
    }

    #[test]
    fn test_from_registry_uses_override() {
        let custom = Pubkey::new_unique();
        let mut programs = ProgramRegistry::default();
        programs.add(
            crate::programs::Program::new(MPLX_REWARDS_PROGRAM_NAME, custom),
            true,
        );

        assert_eq!(RewardPoolGpaBuilder::from_registry(&programs).program_id(), custom);
        assert_eq!(
            RewardPoolGpaBuilder::from_registry(&ProgramRegistry::new()).program_id(),
            MPLX_REWARDS_ID
        );
    }
}
