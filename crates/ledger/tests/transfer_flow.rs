//! End-to-end transfer flow through signed operations

use std::sync::Arc;

use anyhow::Result;
use hookgate_core::{Address, Keypair, Signer, TokenAmount};
use hookgate_hook::{HookError, HookInstruction, HookSettings, WhitelistHook};
use hookgate_ledger::{
    associated_token_address, mint_address, LedgerError, LedgerOperation, SignedOperation,
    TokenLedger,
};
use rust_decimal_macros::dec;

const DECIMALS: u8 = 9;

struct World {
    ledger: TokenLedger,
    hook: Arc<WhitelistHook>,
    admin: Keypair,
    mint: Address,
    source: Address,
}

impl World {
    fn submit(&mut self, operation: LedgerOperation, signer: &Keypair) -> Result<(), LedgerError> {
        let signed = SignedOperation::sign(operation, signer)?;
        self.ledger.submit(&signed)
    }

    fn invoke(&mut self, instruction: HookInstruction, signer: &Keypair) -> Result<(), LedgerError> {
        let program_id = hookgate_hook::id();
        self.submit(
            LedgerOperation::Invoke {
                program_id,
                data: instruction.pack(),
            },
            signer,
        )
    }

    fn open_account(&mut self, owner: &Keypair) -> Result<Address> {
        let admin = self.admin.clone();
        self.submit(
            LedgerOperation::CreateAccount {
                owner: owner.address(),
                mint: self.mint,
            },
            &admin,
        )?;
        Ok(associated_token_address(&owner.address(), &self.mint)?)
    }

    fn allow(&mut self, address: Address, signer: &Keypair) -> Result<(), LedgerError> {
        let mint = self.mint;
        self.invoke(HookInstruction::AddToAllowList { mint, address }, signer)
    }

    fn disallow(&mut self, address: Address, signer: &Keypair) -> Result<(), LedgerError> {
        let mint = self.mint;
        self.invoke(HookInstruction::RemoveFromAllowList { mint, address }, signer)
    }

    fn transfer(&mut self, destination: Address, amount: TokenAmount) -> Result<(), LedgerError> {
        let admin = self.admin.clone();
        let (source, mint) = (self.source, self.mint);
        self.submit(
            LedgerOperation::Transfer {
                source,
                mint,
                destination,
                amount,
                decimals: DECIMALS,
            },
            &admin,
        )
    }

    fn balance(&self, account: &Address) -> TokenAmount {
        self.ledger.balance(account).unwrap()
    }

    fn allowlist_len(&self) -> usize {
        self.hook
            .allowlist(self.ledger.store(), &self.mint)
            .unwrap()
            .len()
    }
}

fn ui(value: rust_decimal::Decimal) -> TokenAmount {
    TokenAmount::from_ui(value, DECIMALS).unwrap()
}

/// Mint with the whitelist hook, descriptor initialized, 100 tokens in the
/// admin's account
fn setup(settings: HookSettings) -> Result<World> {
    let hook = Arc::new(WhitelistHook::new(settings)?);
    let mut ledger = TokenLedger::new();
    ledger.register_hook(hook.clone());

    let admin = Keypair::generate();
    let mint = mint_address(&admin.address(), "GATE")?;

    let mut world = World {
        ledger,
        hook,
        admin: admin.clone(),
        mint,
        source: Address::default(),
    };

    world.submit(
        LedgerOperation::CreateMint {
            name: "GATE".to_string(),
            decimals: DECIMALS,
            transfer_hook_program_id: Some(hookgate_hook::id()),
        },
        &admin,
    )?;
    world.source = world.open_account(&admin)?;
    world.submit(
        LedgerOperation::MintTo {
            mint,
            destination: world.source,
            amount: ui(dec!(100)),
        },
        &admin,
    )?;

    world.invoke(
        HookInstruction::InitializeConfig {
            mint,
            authority: admin.address(),
        },
        &admin,
    )?;
    world.invoke(HookInstruction::InitializeExtraAccountMetaList { mint }, &admin)?;

    Ok(world)
}

fn hook_error(err: &LedgerError) -> &HookError {
    err.hook_error().expect("expected a hook error")
}

#[test]
fn test_end_to_end_scenario() -> Result<()> {
    let mut w = setup(HookSettings::default())?;
    let admin = w.admin.clone();
    let d = w.open_account(&Keypair::generate())?;
    let e = w.open_account(&Keypair::generate())?;

    w.allow(d, &admin)?;
    w.transfer(d, ui(dec!(1)))?;
    assert_eq!(w.balance(&w.source), ui(dec!(99)));
    assert_eq!(w.balance(&d), ui(dec!(1)));

    w.disallow(d, &admin)?;
    let err = w.transfer(d, ui(dec!(1))).unwrap_err();
    assert!(matches!(hook_error(&err), HookError::WhitelistRejected(a) if *a == d));
    assert_eq!(w.balance(&w.source), ui(dec!(99)));
    assert_eq!(w.balance(&d), ui(dec!(1)));

    let err = w.transfer(e, ui(dec!(1))).unwrap_err();
    assert!(err.is_rejection());
    assert_eq!(w.balance(&w.source), ui(dec!(99)));
    assert_eq!(w.balance(&e), TokenAmount::ZERO);

    Ok(())
}

#[test]
fn test_rejected_transfer_leaves_state_unchanged() -> Result<()> {
    let mut w = setup(HookSettings::default())?;
    let outsider = w.open_account(&Keypair::generate())?;

    let before = w.ledger.store().clone();
    let err = w.transfer(outsider, ui(dec!(5))).unwrap_err();
    assert!(err.is_rejection());

    let mut expected: Vec<_> = before.iter().collect();
    let mut actual: Vec<_> = w.ledger.store().iter().collect();
    expected.sort_by_key(|(a, _)| **a);
    actual.sort_by_key(|(a, _)| **a);
    assert_eq!(actual, expected);
    assert!(!w.ledger.token_account(&w.source)?.transferring);

    Ok(())
}

#[test]
fn test_non_admin_mutations_unauthorized() -> Result<()> {
    let mut w = setup(HookSettings::default())?;
    let intruder = Keypair::generate();
    let target = w.open_account(&Keypair::generate())?;

    let err = w.allow(target, &intruder).unwrap_err();
    assert!(matches!(hook_error(&err), HookError::Unauthorized { .. }));
    assert_eq!(w.allowlist_len(), 0);

    let admin = w.admin.clone();
    w.allow(target, &admin)?;
    let err = w.disallow(target, &intruder).unwrap_err();
    assert!(matches!(hook_error(&err), HookError::Unauthorized { .. }));
    assert_eq!(w.allowlist_len(), 1);

    Ok(())
}

#[test]
fn test_duplicate_add() -> Result<()> {
    let mut w = setup(HookSettings::default())?;
    let admin = w.admin.clone();
    let target = w.open_account(&Keypair::generate())?;

    w.allow(target, &admin)?;
    let err = w.allow(target, &admin).unwrap_err();
    assert!(matches!(hook_error(&err), HookError::AlreadyPresent(_)));
    assert_eq!(w.allowlist_len(), 1);

    Ok(())
}

#[test]
fn test_zero_amount_and_self_transfer_run_the_hook() -> Result<()> {
    let mut w = setup(HookSettings::default())?;
    let admin = w.admin.clone();
    let target = w.open_account(&Keypair::generate())?;

    let err = w.transfer(target, TokenAmount::ZERO).unwrap_err();
    assert!(err.is_rejection());

    let source = w.source;
    let err = w.transfer(source, ui(dec!(1))).unwrap_err();
    assert!(err.is_rejection());

    w.allow(source, &admin)?;
    w.transfer(source, ui(dec!(1)))?;
    assert_eq!(w.balance(&source), ui(dec!(100)));

    Ok(())
}

#[test]
fn test_missing_descriptor_blocks_transfers() -> Result<()> {
    let hook = Arc::new(WhitelistHook::default());
    let mut ledger = TokenLedger::new();
    ledger.register_hook(hook);

    let admin = Keypair::generate();
    let signer = admin.verified();
    let mint = ledger.create_mint("BARE", DECIMALS, Some(hookgate_hook::id()), &signer)?;
    let from = ledger.create_token_account(admin.address(), mint, &signer)?;
    let to = ledger.create_token_account(Address::new([7; 32]), mint, &signer)?;
    ledger.mint_to(mint, from, TokenAmount::new(10), &signer)?;

    let err = ledger
        .transfer_checked(from, mint, to, TokenAmount::new(1), DECIMALS, &signer)
        .unwrap_err();
    assert!(matches!(hook_error(&err), HookError::NotInitialized(_)));
    assert_eq!(ledger.balance(&from)?, TokenAmount::new(10));

    Ok(())
}

#[test]
fn test_capacity_growth_through_ledger() -> Result<()> {
    let settings = HookSettings {
        initial_capacity: 1,
        ..HookSettings::default()
    }
    .with_max_entries(3);
    let mut w = setup(settings)?;
    let admin = w.admin.clone();

    let members: Vec<Address> = (1..=3u8).map(|n| Address::new([n; 32])).collect();
    for member in &members {
        w.allow(*member, &admin)?;
    }

    let list = w.hook.allowlist(w.ledger.store(), &w.mint)?;
    assert_eq!(list.entries(), members.as_slice());
    assert_eq!(list.capacity(), 3);

    let err = w.allow(Address::new([4; 32]), &admin).unwrap_err();
    assert!(matches!(
        hook_error(&err),
        HookError::CapacityExceeded { max: 3 }
    ));

    Ok(())
}

#[test]
fn test_forged_signature_rejected() -> Result<()> {
    let mut w = setup(HookSettings::default())?;
    let admin = w.admin.clone();
    let target = w.open_account(&Keypair::generate())?;

    let mut signed = SignedOperation::sign(
        LedgerOperation::Invoke {
            program_id: hookgate_hook::id(),
            data: HookInstruction::AddToAllowList {
                mint: w.mint,
                address: target,
            }
            .pack(),
        },
        &Keypair::generate(),
    )?;
    signed.signer = admin.address();

    assert!(matches!(
        w.ledger.submit(&signed),
        Err(LedgerError::Signature(_))
    ));
    assert_eq!(w.allowlist_len(), 0);

    Ok(())
}

#[test]
fn test_mints_cannot_occupy_hook_addresses() -> Result<()> {
    let hook = Arc::new(WhitelistHook::default());
    let mut ledger = TokenLedger::new();
    ledger.register_hook(hook.clone());

    let victim = Keypair::generate();
    let attacker = Keypair::generate();
    let victim_mint = mint_address(&victim.address(), "GATE")?;
    let reserved = [
        hook.config_address(&victim_mint)?,
        hook.extra_account_meta_list_address(&victim_mint)?,
        hook.allowlist_address(&victim_mint)?,
    ];

    // The attacker can only create mints in its own namespace
    for name in ["GATE", "config", "white_list"] {
        let created = ledger.create_mint(name, DECIMALS, None, &attacker.verified())?;
        assert_eq!(created, mint_address(&attacker.address(), name)?);
        assert!(!reserved.contains(&created));
        assert_ne!(created, victim_mint);
    }

    let signer = victim.verified();
    let mint = ledger.create_mint("GATE", DECIMALS, Some(hookgate_hook::id()), &signer)?;
    assert_eq!(mint, victim_mint);
    ledger.invoke(
        hookgate_hook::id(),
        &HookInstruction::InitializeConfig {
            mint,
            authority: victim.address(),
        }
        .pack(),
        &signer,
    )?;
    ledger.invoke(
        hookgate_hook::id(),
        &HookInstruction::InitializeExtraAccountMetaList { mint }.pack(),
        &signer,
    )?;
    assert!(hook.allowlist(ledger.store(), &mint)?.is_empty());

    Ok(())
}
