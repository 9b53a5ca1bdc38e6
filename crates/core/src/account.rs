//! Raw account containers returned by the byte-fetch layer.

use solana_program::pubkey::Pubkey;

use crate::{Result, RewardsError};

/// Account metadata that travels alongside the data bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountHeader {
    /// Address the account was fetched from
    pub address: Pubkey,
    /// Program that owns the account
    pub owner: Pubkey,
    /// Balance in lamports
    pub lamports: u64,
    pub executable: bool,
}

/// An existing on-chain account: header plus undecoded data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAccount {
    pub header: AccountHeader,
    pub data: Vec<u8>,
}

impl RawAccount {
    pub fn new(address: Pubkey, owner: Pubkey, lamports: u64, data: Vec<u8>) -> Self {
        Self {
            header: AccountHeader {
                address,
                owner,
                lamports,
                executable: false,
            },
            data,
        }
    }

    pub fn address(&self) -> Pubkey {
        self.header.address
    }
}

/// Result of fetching a single address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaybeAccount {
    Exists(RawAccount),
    Missing(Pubkey),
}

impl MaybeAccount {
    pub fn address(&self) -> Pubkey {
        match self {
            Self::Exists(account) => account.address(),
            Self::Missing(address) => *address,
        }
    }

    pub fn exists(&self) -> bool {
        matches!(self, Self::Exists(_))
    }

    /// Drop the missing case
    pub fn into_option(self) -> Option<RawAccount> {
        match self {
            Self::Exists(account) => Some(account),
            Self::Missing(_) => None,
        }
    }
}

/// Unwrap an existing account or fail with `AccountNotFound` naming the
/// expected account type.
pub fn assert_account_exists(maybe: MaybeAccount, name: &'static str) -> Result<RawAccount> {
    match maybe {
        MaybeAccount::Exists(account) => Ok(account),
        MaybeAccount::Missing(address) => Err(RewardsError::AccountNotFound { name, address }),
    }
}

/// Wrapper pairing decoded data with the header it was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account<T> {
    pub header: AccountHeader,
    pub data: T,
}

impl<T> Account<T> {
    pub fn address(&self) -> Pubkey {
        self.header.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maybe_account_missing() {
        let address = Pubkey::new_unique();
        let maybe = MaybeAccount::Missing(address);

        assert!(!maybe.exists());
        assert_eq!(maybe.address(), address);
        assert!(maybe.into_option().is_none());
    }

    #[test]
    fn test_assert_account_exists() {
        let address = Pubkey::new_unique();
        let raw = RawAccount::new(address, Pubkey::new_unique(), 1_000, vec![1, 2, 3]);

        let account =
            assert_account_exists(MaybeAccount::Exists(raw.clone()), "RewardPool").unwrap();
        assert_eq!(account, raw);

        let err = assert_account_exists(MaybeAccount::Missing(address), "RewardPool").unwrap_err();
        assert_eq!(
            err,
            RewardsError::AccountNotFound {
                name: "RewardPool",
                address
            }
        );
    }
}
