//! MPL Rewards CLI
//!
//! Command-line interface for inspecting reward pools and filling their vaults.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{read_keypair_file, Keypair, Signer};
use tracing::{debug, info};

use mplx_rewards_client::{ClientConfig, ClientMode, RewardsClient};
use mplx_rewards_core::accounts::{get_reward_pool_size, RewardPool};
use mplx_rewards_core::instructions::FillVaultBuilder;
use mplx_rewards_core::pda::{find_reward_pool_address, find_vault_address};
use mplx_rewards_core::{
    AccountValue, RewardPoolFieldValue, SignerHandle, WrappedInstruction, MPLX_REWARDS_PROGRAM_NAME,
};
use mplx_rewards_logging::init_logging;
use mplx_rewards_settings::{default_settings_path, expand_path, ClientModeSetting, Settings};

/// MPL Rewards - reward pool inspection and vault funding
#[derive(Parser)]
#[command(name = "mplx-rewards")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (defaults to ~/.mplx-rewards/settings.json)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// RPC endpoint, overrides the settings file
    #[arg(long)]
    rpc_url: Option<String>,

    /// Use the in-memory mock client
    #[arg(long)]
    mock: bool,

    /// Keypair file used as fee payer and fill authority
    #[arg(long)]
    keypair: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the encoded size of a reward pool account
    Size,

    /// Inspect reward pools
    Pool {
        #[command(subcommand)]
        action: PoolAction,
    },

    /// Deposit reward tokens into a pool's vault
    FillVault {
        /// Reward pool address
        #[arg(long)]
        reward_pool: String,

        /// Reward token mint
        #[arg(long)]
        reward_mint: String,

        /// Vault address (derived from pool and mint when omitted)
        #[arg(long)]
        vault: Option<String>,

        /// Token account the rewards are taken from
        #[arg(long)]
        source: String,

        /// Amount in base units
        #[arg(long)]
        amount: u64,

        /// Unix timestamp the distribution should last until
        #[arg(long)]
        ends_at: u64,

        /// Token program (defaults to SPL Token)
        #[arg(long)]
        token_program: Option<String>,

        /// Print the instruction instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Derive program addresses
    Pda {
        #[command(subcommand)]
        action: PdaAction,
    },
}

#[derive(Subcommand)]
enum PoolAction {
    /// Show one reward pool
    Show {
        /// Reward pool address
        address: String,

        /// Report a missing account instead of failing
        #[arg(long)]
        safe: bool,
    },

    /// List reward pools, optionally filtered by field
    List {
        #[arg(long)]
        deposit_authority: Option<String>,

        #[arg(long)]
        fill_authority: Option<String>,

        #[arg(long)]
        reward_mint: Option<String>,
    },
}

#[derive(Subcommand)]
enum PdaAction {
    /// Vault of a reward pool for a mint
    Vault {
        #[arg(long)]
        reward_pool: String,

        #[arg(long)]
        reward_mint: String,
    },

    /// Reward pool of a deposit/fill authority pair
    RewardPool {
        #[arg(long)]
        deposit_authority: String,

        #[arg(long)]
        fill_authority: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings_path = cli.settings.clone().unwrap_or_else(default_settings_path);
    let settings = Settings::load_from(&settings_path)
        .with_context(|| format!("Failed to load settings from {:?}", settings_path))?;

    let config = client_config(&cli, &settings)?;
    debug!("Client mode {:?}, endpoint {}", config.mode, config.rpc_url);

    match cli.command {
        Commands::Size => {
            println!("{}", get_reward_pool_size());
        }
        Commands::Pool { action } => {
            let client = RewardsClient::new(config);
            match action {
                PoolAction::Show { address, safe } => {
                    show_pool(&client, &parse_pubkey("address", &address)?, safe).await?;
                }
                PoolAction::List {
                    deposit_authority,
                    fill_authority,
                    reward_mint,
                } => {
                    list_pools(&client, deposit_authority, fill_authority, reward_mint).await?;
                }
            }
        }
        Commands::FillVault {
            reward_pool,
            reward_mint,
            vault,
            source,
            amount,
            ends_at,
            token_program,
            dry_run,
        } => {
            let keypair_path = cli
                .keypair
                .clone()
                .unwrap_or_else(|| settings.wallet.keypair_path.clone());
            let authority = load_keypair(&expand_path(&keypair_path))?;
            let client = RewardsClient::with_payer_handle(config, authority.clone());

            let reward_pool = parse_pubkey("reward-pool", &reward_pool)?;
            let reward_mint = parse_pubkey("reward-mint", &reward_mint)?;
            let vault: AccountValue = match vault {
                Some(vault) => parse_pubkey("vault", &vault)?.into(),
                None => {
                    find_vault_address(&reward_pool, &reward_mint, &client.program_id()?).into()
                }
            };

            let mut builder = FillVaultBuilder::new();
            builder
                .reward_pool(reward_pool)
                .reward_mint(reward_mint)
                .vault(vault)
                .fill_authority(authority)
                .source_token_account(parse_pubkey("source", &source)?)
                .amount(amount)
                .distribution_ends_at(ends_at);
            if let Some(token_program) = token_program {
                builder.token_program(parse_pubkey("token-program", &token_program)?);
            }

            if dry_run {
                print_instruction(&builder.build(client.programs())?);
            } else {
                let signature = client.fill_vault(&builder).await?;
                println!("Vault filled: {}", signature);
            }
        }
        Commands::Pda { action } => {
            let program_id = config
                .program_registry()
                .resolve(MPLX_REWARDS_PROGRAM_NAME)?;
            let (address, bump) = match action {
                PdaAction::Vault {
                    reward_pool,
                    reward_mint,
                } => find_vault_address(
                    &parse_pubkey("reward-pool", &reward_pool)?,
                    &parse_pubkey("reward-mint", &reward_mint)?,
                    &program_id,
                ),
                PdaAction::RewardPool {
                    deposit_authority,
                    fill_authority,
                } => find_reward_pool_address(
                    &parse_pubkey("deposit-authority", &deposit_authority)?,
                    &parse_pubkey("fill-authority", &fill_authority)?,
                    &program_id,
                ),
            };
            println!("Address: {}", address);
            println!("Bump:    {}", bump);
        }
    }

    Ok(())
}

// ============================================================================
// Configuration
// ============================================================================

fn parse_pubkey(what: &str, value: &str) -> Result<Pubkey> {
    Pubkey::from_str(value).with_context(|| format!("Invalid {} address: {}", what, value))
}

fn load_keypair(path: &Path) -> Result<SignerHandle> {
    let keypair: Keypair = read_keypair_file(path)
        .map_err(|e| anyhow!("Failed to read keypair {:?}: {}", path, e))?;
    info!("Using wallet {}", keypair.pubkey());
    Ok(Arc::new(keypair))
}

/// Settings file first, command line flags on top
fn client_config(cli: &Cli, settings: &Settings) -> Result<ClientConfig> {
    let mode = if cli.mock || settings.rpc.mode == ClientModeSetting::Mock {
        ClientMode::Mock
    } else {
        ClientMode::Live
    };

    let mut config = ClientConfig {
        mode,
        rpc_url: cli.rpc_url.clone().unwrap_or_else(|| settings.rpc.url.clone()),
        commitment: settings.rpc.commitment.clone(),
        ..Default::default()
    };

    for (name, address) in &settings.programs.overrides {
        config = config.with_program(name.clone(), parse_pubkey(name, address)?);
    }
    Ok(config)
}

// ============================================================================
// Reward Pools
// ============================================================================

async fn show_pool(client: &RewardsClient, address: &Pubkey, safe: bool) -> Result<()> {
    if safe {
        match client.safe_fetch_reward_pool(address).await? {
            Some(pool) => print_pool(&pool),
            None => println!("No reward pool at {}", address),
        }
    } else {
        let pool = client
            .fetch_reward_pool(address)
            .await
            .with_context(|| format!("Failed to fetch reward pool {}", address))?;
        print_pool(&pool);
    }
    Ok(())
}

async fn list_pools(
    client: &RewardsClient,
    deposit_authority: Option<String>,
    fill_authority: Option<String>,
    reward_mint: Option<String>,
) -> Result<()> {
    let mut gpa = client.reward_pool_gpa();
    if let Some(key) = deposit_authority {
        let key = parse_pubkey("deposit-authority", &key)?;
        gpa = gpa.where_field(RewardPoolFieldValue::DepositAuthority(key));
    }
    if let Some(key) = fill_authority {
        let key = parse_pubkey("fill-authority", &key)?;
        gpa = gpa.where_field(RewardPoolFieldValue::FillAuthority(key));
    }
    if let Some(key) = reward_mint {
        let key = parse_pubkey("reward-mint", &key)?;
        gpa = gpa.where_field(RewardPoolFieldValue::RewardMint(key));
    }

    let pools = client.get_reward_pools(&gpa).await?;
    println!("Found {} reward pool(s)", pools.len());
    for pool in &pools {
        println!();
        print_pool(pool);
    }
    Ok(())
}

fn print_pool(pool: &RewardPool) {
    let data = &pool.data;
    println!("Reward Pool {}", pool.address());
    println!("=============================================================");
    println!("Owner:                 {}", pool.header.owner);
    println!("Lamports:              {}", pool.header.lamports);
    println!("Deposit authority:     {}", data.deposit_authority);
    println!("Distribute authority:  {}", data.distribute_authority);
    println!("Fill authority:        {}", data.fill_authority);
    println!("Reward mint:           {}", data.reward_mint);
    println!("Index with precision:  {}", data.index_with_precision);
    println!("Total share:           {}", data.total_share);
    println!("Distribution ends at:  {}", data.distribution_ends_at);
    println!("Tokens available:      {}", data.tokens_available_for_distribution);
    println!("Vault bump:            {}", data.token_account_bump);
}

fn print_instruction(ix: &WrappedInstruction) {
    println!("Program: {}", ix.instruction.program_id);
    println!("Accounts:");
    for (index, meta) in ix.instruction.accounts.iter().enumerate() {
        println!(
            "  {}. {} {}{}",
            index,
            meta.pubkey,
            if meta.is_writable { "W" } else { "R" },
            if meta.is_signer { "S" } else { "" },
        );
    }
    println!("Data: {}", hex::encode(&ix.instruction.data));
}
