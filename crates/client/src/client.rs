//! Rewards client for interacting with Solana
//!
//! Supports two modes:
//! - **Mock Mode**: For development/testing without Solana. Accounts are held
//!   in memory and fill-vault is applied locally.
//! - **Live Mode**: Actual Solana RPC calls against the rewards program.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use solana_account_decoder::UiAccountEncoding;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::{
    account::Account as SolanaAccount,
    instruction::Instruction,
    message::Message,
    pubkey::Pubkey,
    rent::Rent,
    signature::{Signature, Signer},
    transaction::Transaction,
};

use mplx_rewards_core::accounts::{
    deserialize_reward_pool, serialize_reward_pool, RewardPool, RewardPoolAccountDataArgs,
    REWARD_POOL_ACCOUNT_NAME, REWARD_POOL_SIZE,
};
use mplx_rewards_core::instructions::{FillVaultBuilder, FILL_VAULT_DISCRIMINATOR};
use mplx_rewards_core::{
    assert_account_exists, AccountFilter, MaybeAccount, ProgramRegistry, RawAccount,
    RewardPoolGpaBuilder, SignerHandle, TransactionBuilder, MPLX_REWARDS_PROGRAM_NAME,
};

use crate::config::{ClientConfig, ClientMode};
use crate::mock::{process_fill_vault, MockState};
use crate::{ClientError, Result};

/// `getMultipleAccounts` accepts at most this many keys per call
const MAX_MULTIPLE_ACCOUNTS: usize = 100;

/// Rewards client for on-chain operations
///
/// This client abstracts the Solana RPC calls and transaction building.
/// In mock mode, accounts are tracked in-memory.
pub struct RewardsClient {
    config: ClientConfig,
    /// Fee payer and default signer (required for submissions)
    payer: Option<SignerHandle>,
    /// Program addresses used to build instructions and scans
    programs: ProgramRegistry,
    /// Solana RPC client (only used in Live mode)
    rpc_client: Option<Arc<RpcClient>>,
    /// Mock state (only used in Mock mode)
    mock_state: Arc<RwLock<MockState>>,
}

impl RewardsClient {
    /// Create a read-only client without a payer
    pub fn new(config: ClientConfig) -> Self {
        let rpc_client = if config.mode == ClientMode::Live {
            Some(Arc::new(RpcClient::new_with_commitment(
                config.rpc_url.clone(),
                config.commitment_config(),
            )))
        } else {
            None
        };

        Self {
            programs: config.program_registry(),
            config,
            payer: None,
            rpc_client,
            mock_state: Arc::new(RwLock::new(MockState::default())),
        }
    }

    /// Create a client that pays for and signs transactions with `payer`
    pub fn with_payer<S: Signer + Send + Sync + 'static>(config: ClientConfig, payer: S) -> Self {
        Self::with_payer_handle(config, Arc::new(payer))
    }

    pub fn with_payer_handle(config: ClientConfig, payer: SignerHandle) -> Self {
        Self {
            payer: Some(payer),
            ..Self::new(config)
        }
    }

    /// Check if running in mock mode
    pub fn is_mock(&self) -> bool {
        self.config.mode == ClientMode::Mock
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn programs(&self) -> &ProgramRegistry {
        &self.programs
    }

    /// Address of the rewards program in this client's registry
    pub fn program_id(&self) -> Result<Pubkey> {
        Ok(self.programs.resolve(MPLX_REWARDS_PROGRAM_NAME)?)
    }

    pub fn payer_pubkey(&self) -> Option<Pubkey> {
        self.payer.as_ref().map(|p| p.pubkey())
    }

    fn rpc(&self) -> Result<&RpcClient> {
        self.rpc_client
            .as_deref()
            .ok_or_else(|| ClientError::RpcError("RPC client not initialized".to_string()))
    }

    fn to_raw(address: Pubkey, account: SolanaAccount) -> RawAccount {
        let mut raw = RawAccount::new(address, account.owner, account.lamports, account.data);
        raw.header.executable = account.executable;
        raw
    }

    // ==================== Byte Fetch ====================

    /// Fetch raw bytes and header for one address
    pub async fn get_account(&self, address: &Pubkey) -> Result<MaybeAccount> {
        debug!("Fetching account {}", address);

        if self.is_mock() {
            let state = self.mock_state.read().expect("rewards mock lock poisoned");
            return Ok(match state.accounts.get(address) {
                Some(account) => MaybeAccount::Exists(account.clone()),
                None => MaybeAccount::Missing(*address),
            });
        }

        let rpc = self.rpc()?;
        let response = rpc
            .get_account_with_commitment(address, self.config.commitment_config())
            .await
            .map_err(|e| ClientError::RpcError(format!("get_account: {}", e)))?;

        Ok(match response.value {
            Some(account) => MaybeAccount::Exists(Self::to_raw(*address, account)),
            None => MaybeAccount::Missing(*address),
        })
    }

    /// Fetch several addresses; the output keeps the input order
    pub async fn get_accounts(&self, addresses: &[Pubkey]) -> Result<Vec<MaybeAccount>> {
        debug!("Fetching {} accounts", addresses.len());

        if self.is_mock() {
            let state = self.mock_state.read().expect("rewards mock lock poisoned");
            return Ok(addresses
                .iter()
                .map(|address| match state.accounts.get(address) {
                    Some(account) => MaybeAccount::Exists(account.clone()),
                    None => MaybeAccount::Missing(*address),
                })
                .collect());
        }

        let rpc = self.rpc()?;
        let mut out = Vec::with_capacity(addresses.len());
        for chunk in addresses.chunks(MAX_MULTIPLE_ACCOUNTS) {
            let accounts = rpc
                .get_multiple_accounts(chunk)
                .await
                .map_err(|e| ClientError::RpcError(format!("get_multiple_accounts: {}", e)))?;

            out.extend(chunk.iter().zip(accounts).map(|(address, account)| match account {
                Some(account) => MaybeAccount::Exists(Self::to_raw(*address, account)),
                None => MaybeAccount::Missing(*address),
            }));
        }
        Ok(out)
    }

    // ==================== Reward Pools ====================

    /// Fetch and decode a reward pool; a missing account is an error
    pub async fn fetch_reward_pool(&self, address: &Pubkey) -> Result<RewardPool> {
        let raw =
            assert_account_exists(self.get_account(address).await?, REWARD_POOL_ACCOUNT_NAME)?;
        Ok(deserialize_reward_pool(&raw)?)
    }

    /// Fetch and decode a reward pool; `None` when the account is missing
    pub async fn safe_fetch_reward_pool(&self, address: &Pubkey) -> Result<Option<RewardPool>> {
        match self.get_account(address).await? {
            MaybeAccount::Exists(raw) => Ok(Some(deserialize_reward_pool(&raw)?)),
            MaybeAccount::Missing(_) => Ok(None),
        }
    }

    /// Fetch many reward pools; fails on the first missing account
    pub async fn fetch_all_reward_pool(&self, addresses: &[Pubkey]) -> Result<Vec<RewardPool>> {
        self.get_accounts(addresses)
            .await?
            .into_iter()
            .map(|maybe| {
                let raw = assert_account_exists(maybe, REWARD_POOL_ACCOUNT_NAME)?;
                Ok(deserialize_reward_pool(&raw)?)
            })
            .collect()
    }

    /// Fetch many reward pools, skipping missing accounts
    pub async fn safe_fetch_all_reward_pool(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<RewardPool>> {
        self.get_accounts(addresses)
            .await?
            .into_iter()
            .filter_map(MaybeAccount::into_option)
            .map(|raw| Ok(deserialize_reward_pool(&raw)?))
            .collect()
    }

    /// Scan builder bound to this client's rewards program
    pub fn reward_pool_gpa(&self) -> RewardPoolGpaBuilder {
        RewardPoolGpaBuilder::from_registry(&self.programs)
    }

    /// All reward pools matching the builder's filters
    pub async fn get_reward_pools(
        &self,
        builder: &RewardPoolGpaBuilder,
    ) -> Result<Vec<RewardPool>> {
        debug!(
            "Scanning program {} with {} filters",
            builder.program_id(),
            builder.filters().len()
        );

        if self.is_mock() {
            let state = self.mock_state.read().expect("rewards mock lock poisoned");
            let mut matches: Vec<&RawAccount> = state
                .accounts
                .values()
                .filter(|raw| {
                    raw.header.owner == builder.program_id() && builder.matches(&raw.data)
                })
                .collect();
            matches.sort_by_key(|raw| raw.address());
            return matches
                .into_iter()
                .map(|raw| Ok(deserialize_reward_pool(raw)?))
                .collect();
        }

        let filters = builder
            .filters()
            .iter()
            .map(|filter| match filter {
                AccountFilter::DataSize(size) => RpcFilterType::DataSize(*size),
                AccountFilter::Memcmp { offset, bytes } => {
                    RpcFilterType::Memcmp(Memcmp::new_base58_encoded(*offset, bytes))
                }
            })
            .collect();

        let config = RpcProgramAccountsConfig {
            filters: Some(filters),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.config.commitment_config()),
                ..Default::default()
            },
            ..Default::default()
        };

        let rpc = self.rpc()?;
        let accounts = rpc
            .get_program_accounts_with_config(&builder.program_id(), config)
            .await
            .map_err(|e| ClientError::RpcError(format!("get_program_accounts: {}", e)))?;

        debug!("Scan returned {} accounts", accounts.len());

        accounts
            .into_iter()
            .map(|(address, account)| Ok(deserialize_reward_pool(&Self::to_raw(address, account))?))
            .collect()
    }

    // ==================== Transactions ====================

    /// Build and submit a `FillVault` instruction
    pub async fn fill_vault(&self, builder: &FillVaultBuilder) -> Result<Signature> {
        let ix = builder.build(&self.programs)?;
        if let Some(pool) = ix.instruction.accounts.first() {
            info!("Filling vault of pool {}", pool.pubkey);
        }
        self.send_and_confirm(&TransactionBuilder::from(ix)).await
    }

    /// Sign with the payer plus every collected signer and submit
    pub async fn send_and_confirm(&self, tx: &TransactionBuilder) -> Result<Signature> {
        if self.is_mock() {
            return self.apply_mock_transaction(tx);
        }

        let rpc = self.rpc()?;
        let payer = self.payer.as_ref().ok_or(ClientError::NotAuthorized)?;

        let mut seen = HashSet::new();
        seen.insert(payer.pubkey());
        let mut signers: Vec<&dyn Signer> = Vec::new();
        signers.push(&**payer);
        let extra = tx.signers();
        for signer in &extra {
            if seen.insert(signer.pubkey()) {
                signers.push(&**signer);
            }
        }

        let blockhash = rpc
            .get_latest_blockhash()
            .await
            .map_err(|e| ClientError::RpcError(e.to_string()))?;

        let message = Message::new(&tx.instructions(), Some(&payer.pubkey()));
        let mut transaction = Transaction::new_unsigned(message);
        transaction
            .try_sign(&signers, blockhash)
            .map_err(|e| ClientError::TransactionFailed(e.to_string()))?;

        let signature = rpc
            .send_and_confirm_transaction(&transaction)
            .await
            .map_err(|e| ClientError::TransactionFailed(e.to_string()))?;

        info!("Transaction confirmed: {}", signature);
        Ok(signature)
    }

    /// Run every rewards instruction of `tx` against a copy of the mock
    /// accounts and commit only if all of them succeed.
    fn apply_mock_transaction(&self, tx: &TransactionBuilder) -> Result<Signature> {
        let program_id = self.program_id()?;

        let mut signed: HashSet<Pubkey> = tx.signers().iter().map(|s| s.pubkey()).collect();
        signed.extend(self.payer_pubkey());

        let mut state = self.mock_state.write().expect("rewards mock lock poisoned");
        let now = state.now();
        let mut accounts = state.accounts.clone();

        for ix in tx.instructions() {
            Self::check_mock_signatures(&ix, &signed)?;

            if ix.program_id != program_id {
                debug!("[MOCK] Skipping instruction for program {}", ix.program_id);
                continue;
            }

            match ix.data.first() {
                Some(&FILL_VAULT_DISCRIMINATOR) => {
                    process_fill_vault(&mut accounts, &program_id, &ix, now)?
                }
                other => {
                    return Err(ClientError::TransactionFailed(format!(
                        "unsupported instruction {:?}",
                        other
                    )))
                }
            }
        }

        state.accounts = accounts;
        let signature = state.next_signature();
        info!("[MOCK] Transaction applied: {}", signature);
        Ok(signature)
    }

    fn check_mock_signatures(ix: &Instruction, signed: &HashSet<Pubkey>) -> Result<()> {
        match ix
            .accounts
            .iter()
            .find(|meta| meta.is_signer && !signed.contains(&meta.pubkey))
        {
            Some(meta) => Err(ClientError::TransactionFailed(format!(
                "missing signature for {}",
                meta.pubkey
            ))),
            None => Ok(()),
        }
    }

    // ==================== Mock Helpers ====================

    /// Insert or replace a raw account (mock mode only, for testing)
    pub fn add_mock_account(&self, account: RawAccount) -> Result<()> {
        if !self.is_mock() {
            return Err(ClientError::MockOnly);
        }

        let mut state = self.mock_state.write().expect("rewards mock lock poisoned");
        info!(
            "[MOCK] Added account {} ({} bytes)",
            account.address(),
            account.data.len()
        );
        state.accounts.insert(account.address(), account);
        Ok(())
    }

    /// Encode `args` and store them as a rent-exempt reward pool owned by
    /// the rewards program (mock mode only)
    pub fn add_mock_reward_pool(
        &self,
        address: Pubkey,
        args: RewardPoolAccountDataArgs,
    ) -> Result<()> {
        let data = serialize_reward_pool(args)?;
        let lamports = Rent::default().minimum_balance(REWARD_POOL_SIZE);
        self.add_mock_account(RawAccount::new(address, self.program_id()?, lamports, data))
    }

    /// Pin the mock clock to a unix timestamp (mock mode only)
    pub fn set_mock_clock(&self, unix_timestamp: u64) -> Result<()> {
        if !self.is_mock() {
            return Err(ClientError::MockOnly);
        }

        self.mock_state
            .write()
            .expect("rewards mock lock poisoned")
            .clock = Some(unix_timestamp);
        Ok(())
    }
}
