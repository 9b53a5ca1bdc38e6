//! Account values and the ordering helper shared by every instruction builder.

use std::fmt;
use std::sync::Arc;

use solana_program::{instruction::AccountMeta, pubkey::Pubkey};
use solana_sdk::signature::{Keypair, Signer};

use crate::{Result, RewardsError};

/// Shared handle to anything that can sign a transaction
pub type SignerHandle = Arc<dyn Signer + Send + Sync>;

/// Value supplied for an instruction account role
#[derive(Clone)]
pub enum AccountValue {
    /// Plain address
    PublicKey(Pubkey),
    /// Program-derived address together with its bump seed
    Pda { address: Pubkey, bump: u8 },
    /// Signer-capable value; its public key is used as the address
    Signer(SignerHandle),
}

impl AccountValue {
    pub fn signer<S: Signer + Send + Sync + 'static>(signer: S) -> Self {
        Self::Signer(Arc::new(signer))
    }

    pub fn pubkey(&self) -> Pubkey {
        match self {
            Self::PublicKey(key) => *key,
            Self::Pda { address, .. } => *address,
            Self::Signer(signer) => signer.pubkey(),
        }
    }

    pub fn as_signer(&self) -> Option<&SignerHandle> {
        match self {
            Self::Signer(signer) => Some(signer),
            _ => None,
        }
    }
}

impl fmt::Debug for AccountValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PublicKey(key) => f.debug_tuple("PublicKey").field(key).finish(),
            Self::Pda { address, bump } => f
                .debug_struct("Pda")
                .field("address", address)
                .field("bump", bump)
                .finish(),
            Self::Signer(signer) => f.debug_tuple("Signer").field(&signer.pubkey()).finish(),
        }
    }
}

impl From<Pubkey> for AccountValue {
    fn from(key: Pubkey) -> Self {
        Self::PublicKey(key)
    }
}

/// Matches the `(address, bump)` pair returned by `find_program_address`
impl From<(Pubkey, u8)> for AccountValue {
    fn from((address, bump): (Pubkey, u8)) -> Self {
        Self::Pda { address, bump }
    }
}

impl From<SignerHandle> for AccountValue {
    fn from(signer: SignerHandle) -> Self {
        Self::Signer(signer)
    }
}

impl From<Keypair> for AccountValue {
    fn from(keypair: Keypair) -> Self {
        Self::signer(keypair)
    }
}

/// One account role of an instruction with its fixed position and flags
#[derive(Debug, Clone)]
pub struct ResolvedAccount {
    pub name: &'static str,
    pub index: usize,
    pub is_writable: bool,
    /// The role must be filled by a signer
    pub is_signer: bool,
    /// An unset value is handled by the optional-account strategy
    pub is_optional: bool,
    pub value: Option<AccountValue>,
}

impl ResolvedAccount {
    pub fn new(
        name: &'static str,
        index: usize,
        is_writable: bool,
        value: Option<AccountValue>,
    ) -> Self {
        Self {
            name,
            index,
            is_writable,
            is_signer: false,
            is_optional: false,
            value,
        }
    }

    pub fn signer(mut self) -> Self {
        self.is_signer = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }
}

/// What to put in place of an unset optional account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionalAccountStrategy {
    /// Leave the slot out of the account list
    Omitted,
    /// Fill the slot with the program ID, read-only
    #[default]
    ProgramId,
}

/// Order accounts by index and split them into account metas and signers.
///
/// Caller order is irrelevant; only `index` decides the position. Any value
/// that is a signer is flagged as one in its meta and its handle collected,
/// whether or not the role requires it.
pub fn get_account_metas_and_signers(
    accounts: impl IntoIterator<Item = ResolvedAccount>,
    strategy: OptionalAccountStrategy,
    program_id: Pubkey,
) -> Result<(Vec<AccountMeta>, Vec<SignerHandle>)> {
    let mut ordered: Vec<ResolvedAccount> = accounts.into_iter().collect();
    ordered.sort_by_key(|account| account.index);

    let mut metas = Vec::with_capacity(ordered.len());
    let mut signers = Vec::new();

    for account in ordered {
        match account.value {
            Some(AccountValue::Signer(signer)) => {
                metas.push(AccountMeta {
                    pubkey: signer.pubkey(),
                    is_signer: true,
                    is_writable: account.is_writable,
                });
                signers.push(signer);
            }
            Some(_) | None if account.is_signer => {
                return Err(RewardsError::MissingSigner(account.name));
            }
            Some(value) => metas.push(AccountMeta {
                pubkey: value.pubkey(),
                is_signer: false,
                is_writable: account.is_writable,
            }),
            None if account.is_optional => {
                if strategy == OptionalAccountStrategy::ProgramId {
                    metas.push(AccountMeta::new_readonly(program_id, false));
                }
            }
            None => return Err(RewardsError::MissingAccount(account.name)),
        }
    }

    Ok((metas, signers))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(payer: &SignerHandle, a: Pubkey, b: Pubkey) -> Vec<ResolvedAccount> {
        vec![
            ResolvedAccount::new("second", 1, false, Some(b.into())),
            ResolvedAccount::new("payer", 2, true, Some(payer.clone().into())).signer(),
            ResolvedAccount::new("first", 0, true, Some(a.into())),
        ]
    }

    fn metas_and_signers(
        accounts: Vec<ResolvedAccount>,
        program_id: Pubkey,
    ) -> Result<(Vec<AccountMeta>, Vec<SignerHandle>)> {
        get_account_metas_and_signers(accounts, OptionalAccountStrategy::ProgramId, program_id)
    }

    #[test]
    fn test_orders_by_index() {
        let payer: SignerHandle = Arc::new(Keypair::new());
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();

        let (metas, signers) = metas_and_signers(roles(&payer, a, b), Pubkey::default()).unwrap();

        assert_eq!(metas.len(), 3);
        assert_eq!(metas[0], AccountMeta::new(a, false));
        assert_eq!(metas[1], AccountMeta::new_readonly(b, false));
        assert_eq!(metas[2], AccountMeta::new(payer.pubkey(), true));
        assert_eq!(signers.len(), 1);
        assert_eq!(signers[0].pubkey(), payer.pubkey());
    }

    #[test]
    fn test_caller_order_does_not_leak() {
        let payer: SignerHandle = Arc::new(Keypair::new());
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();

        let mut reversed = roles(&payer, a, b);
        reversed.reverse();

        let (forward, _) = metas_and_signers(roles(&payer, a, b), Pubkey::default()).unwrap();
        let (backward, _) = metas_and_signers(reversed, Pubkey::default()).unwrap();
        assert_eq!(forward, backward);
    }

    // signer handles are not Debug, so errors are matched rather than unwrapped
    #[test]
    fn test_signer_role_with_plain_key_fails() {
        let plain = Pubkey::new_unique();
        let accounts =
            vec![ResolvedAccount::new("authority", 0, false, Some(plain.into())).signer()];

        assert!(matches!(
            metas_and_signers(accounts, Pubkey::default()),
            Err(RewardsError::MissingSigner("authority"))
        ));
    }

    #[test]
    fn test_unset_signer_role_fails() {
        let accounts = vec![ResolvedAccount::new("authority", 0, false, None).signer()];

        assert!(matches!(
            metas_and_signers(accounts, Pubkey::default()),
            Err(RewardsError::MissingSigner("authority"))
        ));
    }

    #[test]
    fn test_unset_required_account_fails() {
        let accounts = vec![ResolvedAccount::new("pool", 0, true, None)];

        assert!(matches!(
            metas_and_signers(accounts, Pubkey::default()),
            Err(RewardsError::MissingAccount("pool"))
        ));
    }

    #[test]
    fn test_optional_account_strategies() {
        let program_id = Pubkey::new_unique();
        let accounts = || vec![ResolvedAccount::new("extra", 0, true, None).optional()];

        let (metas, _) = metas_and_signers(accounts(), program_id).unwrap();
        assert_eq!(metas, vec![AccountMeta::new_readonly(program_id, false)]);

        let (metas, _) =
            get_account_metas_and_signers(accounts(), OptionalAccountStrategy::Omitted, program_id)
                .unwrap();
        assert!(metas.is_empty());
    }

    #[test]
    fn test_signer_in_plain_role_is_marked_signer() {
        let keypair: SignerHandle = Arc::new(Keypair::new());
        let accounts = vec![ResolvedAccount::new("source", 0, true, Some(keypair.clone().into()))];

        let (metas, signers) = metas_and_signers(accounts, Pubkey::default()).unwrap();
        assert_eq!(metas[0], AccountMeta::new(keypair.pubkey(), true));
        assert_eq!(signers.len(), 1);
    }

    #[test]
    fn test_pda_value_uses_address() {
        let (address, bump) = Pubkey::find_program_address(&[b"seed"], &Pubkey::new_unique());
        let value = AccountValue::from((address, bump));

        assert_eq!(value.pubkey(), address);
        assert!(value.as_signer().is_none());
        assert!(format!("{:?}", value).contains("Pda"));
    }
}
