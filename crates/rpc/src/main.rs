//! HookGate CLI - Main entry point

use hookgate_core::{Address, Keypair, Signer};
use hookgate_hook::HookSettings;
use hookgate_ledger::associated_token_address;
use hookgate_rpc::{commands, AppContext, GateService};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "hookgate")]
#[command(about = "HookGate - Allow-list transfer hook for a token ledger", long_about = None)]
struct Cli {
    /// Data directory path
    #[arg(short, long, default_value = "./data")]
    data: PathBuf,

    /// Hook settings file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Signing key file (hex seed); falls back to HOOKGATE_KEY
    #[arg(short, long)]
    key: Option<PathBuf>,

    /// Optional correlation ID
    #[arg(long, global = true)]
    correlation_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new signing key
    Keygen {
        /// Output file path
        #[arg(long, default_value = "signer.key")]
        output: PathBuf,
    },

    /// Create a mint (signer becomes mint authority)
    CreateMint {
        /// Mint name, used to derive its address
        name: String,
        /// Decimal places
        #[arg(long, default_value = "9")]
        decimals: u8,
        /// Create the mint without a transfer hook
        #[arg(long)]
        no_hook: bool,
    },

    /// Create the token account of an owner
    CreateAccount {
        /// Mint address
        mint: Address,
        /// Owner address (defaults to the signer)
        #[arg(long)]
        owner: Option<Address>,
    },

    /// Issue tokens to an owner's token account
    MintTo {
        /// Mint address
        mint: Address,
        /// Owner address
        owner: Address,
        /// Amount to mint
        amount: Decimal,
    },

    /// Initialize the hook config for a mint
    InitConfig {
        /// Mint address
        mint: Address,
        /// Allow-list authority (defaults to the signer)
        #[arg(long)]
        authority: Option<Address>,
    },

    /// Initialize the extra-account descriptor and allow-list
    InitHook {
        /// Mint address
        mint: Address,
    },

    /// Add a token account to the allow-list
    Allow {
        /// Mint address
        mint: Address,
        /// Token account address
        address: Address,
        /// Treat ADDRESS as a wallet and use its token account
        #[arg(long)]
        owner: bool,
    },

    /// Remove a token account from the allow-list
    Disallow {
        /// Mint address
        mint: Address,
        /// Token account address
        address: Address,
        /// Treat ADDRESS as a wallet and use its token account
        #[arg(long)]
        owner: bool,
    },

    /// Transfer from the signer's token account
    Transfer {
        /// Mint address
        mint: Address,
        /// Destination owner address
        to: Address,
        /// Amount to transfer
        amount: Decimal,
    },

    /// Check balance for an owner
    Balance {
        /// Mint address
        mint: Address,
        /// Owner address (defaults to the signer)
        owner: Option<Address>,
    },

    /// List the allow-list of a mint
    Allowlist {
        /// Mint address
        mint: Address,
    },

    /// Audit the journal (verify hash chain)
    Audit,
}

fn target(mint: &Address, address: Address, owner: bool) -> anyhow::Result<Address> {
    if owner {
        Ok(associated_token_address(&address, mint)?)
    } else {
        Ok(address)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Commands::Keygen { output } = &cli.command {
        let key = Keypair::generate();
        let seed = key.seed_hex();

        std::fs::write(output, &seed)?;
        println!("✅ Generated signing key");
        println!("   Private key saved to: {}", output.display());
        println!("   Address: {}", key.address());
        println!();
        println!("To use: export {}={}", commands::KEY_ENV, seed);
        return Ok(());
    }

    let settings = match &cli.config {
        Some(path) => HookSettings::from_file(path)?,
        None => HookSettings::default(),
    };

    // Create application context
    let ctx = AppContext::new(&cli.data, settings)?;
    let svc = GateService::new(ctx);

    let key = || commands::load_key(cli.key.as_deref());
    let correlation_id = cli
        .correlation_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    match cli.command {
        Commands::Keygen { .. } => {}

        Commands::CreateMint {
            name,
            decimals,
            no_hook,
        } => {
            commands::create_mint(&svc, &key()?, &name, decimals, !no_hook, &correlation_id).await?;
        }

        Commands::CreateAccount { mint, owner } => {
            let key = key()?;
            let owner = owner.unwrap_or_else(|| key.address());
            commands::create_account(&svc, &key, owner, mint, &correlation_id).await?;
        }

        Commands::MintTo {
            mint,
            owner,
            amount,
        } => {
            commands::mint_to(&svc, &key()?, mint, owner, amount, &correlation_id).await?;
        }

        Commands::InitConfig { mint, authority } => {
            let key = key()?;
            let authority = authority.unwrap_or_else(|| key.address());
            commands::init_config(&svc, &key, mint, authority, &correlation_id).await?;
        }

        Commands::InitHook { mint } => {
            commands::init_hook(&svc, &key()?, mint, &correlation_id).await?;
        }

        Commands::Allow {
            mint,
            address,
            owner,
        } => {
            let address = target(&mint, address, owner)?;
            commands::allow(&svc, &key()?, mint, address, &correlation_id).await?;
        }

        Commands::Disallow {
            mint,
            address,
            owner,
        } => {
            let address = target(&mint, address, owner)?;
            commands::disallow(&svc, &key()?, mint, address, &correlation_id).await?;
        }

        Commands::Transfer { mint, to, amount } => {
            commands::transfer(&svc, &key()?, mint, to, amount, &correlation_id).await?;
        }

        Commands::Balance { mint, owner } => {
            let owner = match owner {
                Some(owner) => owner,
                None => key()?.address(),
            };
            commands::balance(&svc, mint, owner).await?;
        }

        Commands::Allowlist { mint } => {
            commands::allowlist(&svc, mint).await?;
        }

        Commands::Audit => {
            commands::audit(&svc).await?;
        }
    }

    Ok(())
}
