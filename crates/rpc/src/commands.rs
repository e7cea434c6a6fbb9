//! CLI commands

use std::path::Path;

use hookgate_core::{Address, Keypair, Signer, TokenAmount};
use hookgate_events::JournalRecord;
use hookgate_hook::HookInstruction;
use hookgate_ledger::{associated_token_address, mint_address, LedgerOperation, SignedOperation};
use rust_decimal::Decimal;

use crate::service::GateService;

/// Environment variable holding the signer's hex seed
pub const KEY_ENV: &str = "HOOKGATE_KEY";

/// Load the signing key from a seed file, falling back to `HOOKGATE_KEY`
pub fn load_key(path: Option<&Path>) -> Result<Keypair, anyhow::Error> {
    let seed = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => std::env::var(KEY_ENV)
            .map_err(|_| anyhow::anyhow!("No signing key: pass --key or set {}", KEY_ENV))?,
    };
    Ok(Keypair::from_hex(seed.trim())?)
}

async fn submit(
    svc: &GateService,
    key: &Keypair,
    operation: LedgerOperation,
    correlation_id: &str,
) -> Result<JournalRecord, anyhow::Error> {
    let signed = SignedOperation::sign_with_id(operation, key, correlation_id.to_string())?;
    Ok(svc.submit(signed).await?)
}

async fn invoke(
    svc: &GateService,
    key: &Keypair,
    instruction: HookInstruction,
    correlation_id: &str,
) -> Result<JournalRecord, anyhow::Error> {
    let operation = LedgerOperation::Invoke {
        program_id: hookgate_hook::id(),
        data: instruction.pack(),
    };
    submit(svc, key, operation, correlation_id).await
}

async fn to_amount(svc: &GateService, mint: &Address, amount: Decimal) -> Result<TokenAmount, anyhow::Error> {
    let decimals = svc.mint(mint).await?.decimals;
    Ok(TokenAmount::from_ui(amount, decimals)?)
}

/// Create a mint named `name`, optionally gated by the whitelist hook
pub async fn create_mint(
    svc: &GateService,
    key: &Keypair,
    name: &str,
    decimals: u8,
    with_hook: bool,
    correlation_id: &str,
) -> Result<Address, anyhow::Error> {
    let mint = mint_address(&key.address(), name)?;
    let transfer_hook_program_id = with_hook.then(hookgate_hook::id);

    let committed = submit(
        svc,
        key,
        LedgerOperation::CreateMint {
            name: name.to_string(),
            decimals,
            transfer_hook_program_id,
        },
        correlation_id,
    )
    .await?;

    println!("✅ Created mint {} (seq: {})", name, committed.sequence);
    println!("   Address: {}", mint);
    if with_hook {
        println!("   Transfer hook: {}", hookgate_hook::id());
    }
    Ok(mint)
}

/// Create the associated token account of `owner` for `mint`
pub async fn create_account(
    svc: &GateService,
    key: &Keypair,
    owner: Address,
    mint: Address,
    correlation_id: &str,
) -> Result<Address, anyhow::Error> {
    let committed = submit(
        svc,
        key,
        LedgerOperation::CreateAccount { owner, mint },
        correlation_id,
    )
    .await?;

    let account = associated_token_address(&owner, &mint)?;
    println!("✅ Created token account (seq: {})", committed.sequence);
    println!("   Address: {}", account);
    Ok(account)
}

/// Issue `amount` to the token account of `owner`
pub async fn mint_to(
    svc: &GateService,
    key: &Keypair,
    mint: Address,
    owner: Address,
    amount: Decimal,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    let destination = associated_token_address(&owner, &mint)?;
    let raw = to_amount(svc, &mint, amount).await?;

    let committed = submit(
        svc,
        key,
        LedgerOperation::MintTo {
            mint,
            destination,
            amount: raw,
        },
        correlation_id,
    )
    .await?;

    println!("✅ Minted {} to {} (seq: {})", amount, owner, committed.sequence);
    Ok(())
}

/// Create the hook config for `mint`
pub async fn init_config(
    svc: &GateService,
    key: &Keypair,
    mint: Address,
    authority: Address,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    let committed = invoke(
        svc,
        key,
        HookInstruction::InitializeConfig { mint, authority },
        correlation_id,
    )
    .await?;

    println!("✅ Hook config initialized (seq: {})", committed.sequence);
    println!("   Authority: {}", authority);
    Ok(())
}

/// Create the extra-account descriptor and the empty allow-list
pub async fn init_hook(
    svc: &GateService,
    key: &Keypair,
    mint: Address,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    let committed = invoke(
        svc,
        key,
        HookInstruction::InitializeExtraAccountMetaList { mint },
        correlation_id,
    )
    .await?;

    println!("✅ Transfer hook initialized for {} (seq: {})", mint, committed.sequence);
    Ok(())
}

/// Add a token account to the allow-list
pub async fn allow(
    svc: &GateService,
    key: &Keypair,
    mint: Address,
    address: Address,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    let committed = invoke(
        svc,
        key,
        HookInstruction::AddToAllowList { mint, address },
        correlation_id,
    )
    .await?;

    println!("✅ Allowed {} (seq: {})", address, committed.sequence);
    Ok(())
}

/// Remove a token account from the allow-list
pub async fn disallow(
    svc: &GateService,
    key: &Keypair,
    mint: Address,
    address: Address,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    let committed = invoke(
        svc,
        key,
        HookInstruction::RemoveFromAllowList { mint, address },
        correlation_id,
    )
    .await?;

    println!("✅ Removed {} (seq: {})", address, committed.sequence);
    Ok(())
}

/// Transfer from the signer's token account to the token account of `to`
pub async fn transfer(
    svc: &GateService,
    key: &Keypair,
    mint: Address,
    to: Address,
    amount: Decimal,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    let source = associated_token_address(&key.address(), &mint)?;
    let destination = associated_token_address(&to, &mint)?;
    let decimals = svc.mint(&mint).await?.decimals;
    let raw = TokenAmount::from_ui(amount, decimals)?;

    let signed = SignedOperation::sign_with_id(
        LedgerOperation::Transfer {
            source,
            mint,
            destination,
            amount: raw,
            decimals,
        },
        key,
        correlation_id.to_string(),
    )?;

    match svc.submit(signed).await {
        Ok(committed) => {
            println!(
                "✅ Transferred {} to {} (seq: {})",
                amount, to, committed.sequence
            );
            Ok(())
        }
        Err(e) if e.ledger_error().is_some_and(|e| e.is_rejection()) => {
            println!("⛔ Transfer rejected: {} is not allow-listed", destination);
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Show the balance of `owner` for `mint`
pub async fn balance(svc: &GateService, mint: Address, owner: Address) -> Result<(), anyhow::Error> {
    let account = associated_token_address(&owner, &mint)?;
    let decimals = svc.mint(&mint).await?.decimals;
    let amount = svc.balance(&account).await?;

    println!("Balance for {}: {}", owner, amount.to_ui(decimals));
    println!("   Account: {}", account);
    Ok(())
}

/// List the allow-list of `mint`
pub async fn allowlist(svc: &GateService, mint: Address) -> Result<(), anyhow::Error> {
    let list = svc.allowlist(&mint).await?;

    println!("Allow-list for {} ({}/{} entries)", mint, list.len(), list.capacity());
    println!("   Authority: {}", list.authority());
    for entry in list.entries() {
        println!("   {}", entry);
    }
    Ok(())
}

/// Verify the journal's hash chain
pub async fn audit(svc: &GateService) -> Result<(), anyhow::Error> {
    match svc.audit().await {
        Ok(count) => {
            println!("✅ Hash chain verified ({} records)", count);
            Ok(())
        }
        Err(e) => {
            println!("❌ Hash chain broken: {}", e);
            Err(e.into())
        }
    }
}
