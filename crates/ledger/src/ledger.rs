//! Token ledger - mints, token accounts and hook-gated transfers
//!
//! Every operation runs inside one [`StoreTransaction`]. A transfer of a
//! mint with a transfer hook looks like this:
//!
//! ```text
//! transfer_checked
//!        │
//!        ▼
//! ┌─────────────────────────┐
//! │ Check owner, mint,      │──► error: nothing staged survives
//! │ decimals, funds         │
//! └──────────┬──────────────┘
//!            ▼
//! ┌─────────────────────────┐
//! │ Stage debit/credit,     │
//! │ set source.transferring │
//! └──────────┬──────────────┘
//!            ▼
//! ┌─────────────────────────┐
//! │ Resolve descriptor,     │──► hook error: transaction dropped
//! │ run hook (read-only)    │
//! └──────────┬──────────────┘
//!            ▼
//! clear transferring, commit
//! ```

use std::sync::Arc;

use hookgate_core::{
    derive_address, token_program_id, AccountStore, AccountView, Address, Mint, StoreError,
    StoreTransaction, TokenAccount, TokenAmount, VerifiedSigner,
};
use hookgate_hook::{
    extra_account_meta_list_address, AccountRef, ExecuteAccounts, ExtraAccountMetaList, HookError,
    HookProgram,
};

use crate::error::{LedgerError, LedgerResult};
use crate::operation::{LedgerOperation, SignedOperation};
use crate::registry::HookRegistry;

/// Program that owns associated token accounts
pub fn associated_token_program_id() -> Address {
    Address::hash_of(b"hookgate:associated-token-program")
}

/// Canonical token account of `owner` for `mint`
pub fn associated_token_address(owner: &Address, mint: &Address) -> LedgerResult<Address> {
    Ok(derive_address(
        &[owner.as_ref(), token_program_id().as_ref(), mint.as_ref()],
        &associated_token_program_id(),
    )?)
}

/// Address of the mint named `name` under `authority`
pub fn mint_address(authority: &Address, name: &str) -> LedgerResult<Address> {
    Ok(derive_address(
        &[b"mint", authority.as_ref(), name.as_bytes()],
        &token_program_id(),
    )?)
}

/// In-process token ledger
#[derive(Debug, Default)]
pub struct TokenLedger {
    store: AccountStore,
    hooks: HookRegistry,
}

impl TokenLedger {
    /// Create an empty ledger with no hook programs
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty ledger with the given hook programs
    pub fn with_hooks(hooks: HookRegistry) -> Self {
        Self {
            store: AccountStore::new(),
            hooks,
        }
    }

    /// Register a hook program
    pub fn register_hook(&mut self, program: Arc<dyn HookProgram>) {
        self.hooks.register(program);
    }

    /// Read-only view of all accounts
    pub fn store(&self) -> &AccountStore {
        &self.store
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    // === Queries ===

    /// Load a mint
    pub fn mint(&self, mint: &Address) -> LedgerResult<Mint> {
        load_mint(&self.store, mint)
    }

    /// Load a token account
    pub fn token_account(&self, address: &Address) -> LedgerResult<TokenAccount> {
        load_token_account(&self.store, address)
    }

    /// Balance of a token account in base units
    pub fn balance(&self, address: &Address) -> LedgerResult<TokenAmount> {
        Ok(self.token_account(address)?.amount)
    }

    // === Operations ===

    /// Verify and apply a signed operation
    pub fn submit(&mut self, signed: &SignedOperation) -> LedgerResult<()> {
        self.submit_with(signed, || Ok(()))
    }

    /// Verify and stage a signed operation, then commit it only if
    /// `before_commit` succeeds
    pub fn submit_with<T, E, F>(&mut self, signed: &SignedOperation, before_commit: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<LedgerError>,
    {
        let signer = signed.verify()?;
        tracing::debug!(
            correlation_id = %signed.correlation_id,
            kind = %signed.operation.kind(),
            signer = %signer.address(),
            "Operation submitted"
        );
        self.apply_with(&signed.operation, &signer, before_commit)
    }

    /// Apply an operation on behalf of a verified signer
    pub fn apply(&mut self, operation: &LedgerOperation, signer: &VerifiedSigner) -> LedgerResult<()> {
        self.apply_with(operation, signer, || Ok(()))
    }

    /// Stage `operation`, run `before_commit`, then commit
    ///
    /// Any error, including one from `before_commit`, drops the staged
    /// writes and leaves the store unchanged.
    pub fn apply_with<T, E, F>(
        &mut self,
        operation: &LedgerOperation,
        signer: &VerifiedSigner,
        before_commit: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<LedgerError>,
    {
        let mut tx = self.store.begin();
        stage(&mut tx, &self.hooks, operation, signer)?;
        let output = before_commit()?;
        let written = tx.commit();

        tracing::info!(
            kind = %operation.kind(),
            signer = %signer.address(),
            written,
            "Operation committed"
        );
        Ok(output)
    }

    /// Create the mint named `name` with `authority` as mint authority
    ///
    /// The mint lives at [`mint_address`]`(authority, name)`, so a signer
    /// can only create mints in its own namespace.
    pub fn create_mint(
        &mut self,
        name: &str,
        decimals: u8,
        transfer_hook_program_id: Option<Address>,
        authority: &VerifiedSigner,
    ) -> LedgerResult<Address> {
        let mint = mint_address(authority.address(), name)?;
        let operation = LedgerOperation::CreateMint {
            name: name.to_string(),
            decimals,
            transfer_hook_program_id,
        };
        self.apply(&operation, authority)?;
        Ok(mint)
    }

    /// Create the associated token account of (owner, mint)
    pub fn create_token_account(
        &mut self,
        owner: Address,
        mint: Address,
        payer: &VerifiedSigner,
    ) -> LedgerResult<Address> {
        let address = associated_token_address(&owner, &mint)?;
        self.apply(&LedgerOperation::CreateAccount { owner, mint }, payer)?;
        Ok(address)
    }

    /// Issue `amount` new tokens into `destination`
    pub fn mint_to(
        &mut self,
        mint: Address,
        destination: Address,
        amount: TokenAmount,
        authority: &VerifiedSigner,
    ) -> LedgerResult<()> {
        let operation = LedgerOperation::MintTo {
            mint,
            destination,
            amount,
        };
        self.apply(&operation, authority)
    }

    /// Move `amount` from `source` to `destination`, running the mint's hook
    pub fn transfer_checked(
        &mut self,
        source: Address,
        mint: Address,
        destination: Address,
        amount: TokenAmount,
        decimals: u8,
        authority: &VerifiedSigner,
    ) -> LedgerResult<()> {
        let operation = LedgerOperation::Transfer {
            source,
            mint,
            destination,
            amount,
            decimals,
        };
        self.apply(&operation, authority)
    }

    /// Pass a client instruction to a hook program
    pub fn invoke(
        &mut self,
        program_id: Address,
        data: &[u8],
        signer: &VerifiedSigner,
    ) -> LedgerResult<()> {
        let operation = LedgerOperation::Invoke {
            program_id,
            data: data.to_vec(),
        };
        self.apply(&operation, signer)
    }
}

fn stage(
    tx: &mut StoreTransaction<'_>,
    hooks: &HookRegistry,
    operation: &LedgerOperation,
    signer: &VerifiedSigner,
) -> LedgerResult<()> {
    match operation {
        LedgerOperation::CreateMint {
            name,
            decimals,
            transfer_hook_program_id,
        } => stage_create_mint(tx, hooks, name, *decimals, *transfer_hook_program_id, signer),
        LedgerOperation::CreateAccount { owner, mint } => {
            stage_create_account(tx, *owner, *mint, signer)
        }
        LedgerOperation::MintTo {
            mint,
            destination,
            amount,
        } => stage_mint_to(tx, *mint, *destination, *amount, signer),
        LedgerOperation::Transfer {
            source,
            mint,
            destination,
            amount,
            decimals,
        } => stage_transfer(tx, hooks, [*source, *mint, *destination], *amount, *decimals, signer),
        LedgerOperation::Invoke { program_id, data } => {
            stage_invoke(tx, hooks, *program_id, data, signer)
        }
    }
}

fn stage_create_mint(
    tx: &mut StoreTransaction<'_>,
    hooks: &HookRegistry,
    name: &str,
    decimals: u8,
    transfer_hook_program_id: Option<Address>,
    authority: &VerifiedSigner,
) -> LedgerResult<()> {
    if decimals > hookgate_core::amount::MAX_DECIMALS {
        return Err(hookgate_core::AmountError::UnsupportedDecimals(decimals).into());
    }
    if let Some(program_id) = transfer_hook_program_id {
        if !hooks.contains(&program_id) {
            return Err(LedgerError::HookProgramNotFound(program_id));
        }
    }

    let mint = mint_address(authority.address(), name)?;
    let state = Mint {
        mint_authority: *authority.address(),
        decimals,
        supply: TokenAmount::ZERO,
        transfer_hook_program_id,
    };
    tx.create(mint, token_program_id(), &state)?;

    tracing::debug!(
        mint = %mint,
        name,
        decimals,
        hook = ?transfer_hook_program_id.map(|id| id.to_string()),
        "Mint staged"
    );
    Ok(())
}

fn stage_create_account(
    tx: &mut StoreTransaction<'_>,
    owner: Address,
    mint: Address,
    payer: &VerifiedSigner,
) -> LedgerResult<()> {
    let address = associated_token_address(&owner, &mint)?;
    load_mint(&*tx, &mint)?;
    tx.create(address, token_program_id(), &TokenAccount::new(mint, owner))?;

    tracing::debug!(
        account = %address,
        owner = %owner,
        mint = %mint,
        payer = %payer.address(),
        "Token account staged"
    );
    Ok(())
}

fn stage_mint_to(
    tx: &mut StoreTransaction<'_>,
    mint: Address,
    destination: Address,
    amount: TokenAmount,
    authority: &VerifiedSigner,
) -> LedgerResult<()> {
    let mut mint_state = load_mint(&*tx, &mint)?;
    if mint_state.mint_authority != *authority.address() {
        return Err(LedgerError::MintAuthorityMismatch {
            mint,
            signer: *authority.address(),
        });
    }

    let mut account = load_token_account(&*tx, &destination)?;
    check_mint(&destination, &account, &mint)?;

    mint_state.supply = mint_state
        .supply
        .checked_add(amount)
        .ok_or(LedgerError::Overflow)?;
    account.amount = account
        .amount
        .checked_add(amount)
        .ok_or(LedgerError::Overflow)?;

    tx.save(mint, token_program_id(), &mint_state)?;
    tx.save(destination, token_program_id(), &account)?;

    tracing::debug!(mint = %mint, destination = %destination, amount = %amount, "Mint-to staged");
    Ok(())
}

/// `keys` is `[source, mint, destination]`
fn stage_transfer(
    tx: &mut StoreTransaction<'_>,
    hooks: &HookRegistry,
    keys: [Address; 3],
    amount: TokenAmount,
    decimals: u8,
    authority: &VerifiedSigner,
) -> LedgerResult<()> {
    let [source, mint, destination] = keys;

    let mint_state = load_mint(&*tx, &mint)?;
    if mint_state.decimals != decimals {
        return Err(LedgerError::DecimalsMismatch {
            mint,
            expected: mint_state.decimals,
            actual: decimals,
        });
    }

    let mut from = load_token_account(&*tx, &source)?;
    check_mint(&source, &from, &mint)?;
    if from.owner != *authority.address() {
        return Err(LedgerError::OwnerMismatch {
            account: source,
            signer: *authority.address(),
            owner: from.owner,
        });
    }

    let mut to = load_token_account(&*tx, &destination)?;
    check_mint(&destination, &to, &mint)?;

    if from.amount < amount {
        return Err(LedgerError::InsufficientFunds {
            account: source,
            balance: from.amount,
            requested: amount,
        });
    }

    if source != destination {
        from.amount = from
            .amount
            .checked_sub(amount)
            .ok_or(LedgerError::Overflow)?;
        to.amount = to.amount.checked_add(amount).ok_or(LedgerError::Overflow)?;
        tx.save(destination, token_program_id(), &to)?;
    }

    if let Some(program_id) = mint_state.transfer_hook_program_id {
        let hook = hooks
            .get(&program_id)
            .ok_or(LedgerError::HookProgramNotFound(program_id))?;

        from.transferring = true;
        tx.save(source, token_program_id(), &from)?;

        if let Err(e) = run_hook(
            hook.as_ref(),
            tx,
            [source, mint, destination, from.owner],
            amount,
        ) {
            tracing::warn!(
                hook = hook.name(),
                source = %source,
                destination = %destination,
                amount = %amount,
                error = %e,
                "Transfer hook failed, rolling back"
            );
            return Err(e);
        }

        from.transferring = false;
    }

    tx.save(source, token_program_id(), &from)?;

    tracing::debug!(
        mint = %mint,
        source = %source,
        destination = %destination,
        amount = %amount,
        "Transfer staged"
    );
    Ok(())
}

fn stage_invoke(
    tx: &mut StoreTransaction<'_>,
    hooks: &HookRegistry,
    program_id: Address,
    data: &[u8],
    signer: &VerifiedSigner,
) -> LedgerResult<()> {
    let hook = hooks
        .get(&program_id)
        .ok_or(LedgerError::HookProgramNotFound(program_id))?;

    hook.process_instruction(tx, data, signer)
        .map_err(|e| LedgerError::hook(program_id, e))?;

    tracing::debug!(hook = hook.name(), staged = tx.staged_len(), "Hook instruction staged");
    Ok(())
}

/// Resolve the descriptor's extra accounts and run Execute
///
/// `keys` is `[source, mint, destination, owner]`; the descriptor address is
/// appended as key 4.
fn run_hook(
    hook: &dyn HookProgram,
    tx: &StoreTransaction<'_>,
    keys: [Address; 4],
    amount: TokenAmount,
) -> LedgerResult<()> {
    let program_id = hook.program_id();
    let [source, mint, destination, owner] = keys;
    let descriptor_address = extra_account_meta_list_address(&mint, &program_id)
        .map_err(|e| LedgerError::hook(program_id, e))?;

    let at = |address: Address| AccountRef::readonly(address, tx.account(&address));
    let mut accounts = ExecuteAccounts {
        source: at(source),
        mint: at(mint),
        destination: at(destination),
        owner: at(owner),
        extra_account_meta_list: at(descriptor_address),
        extra: Vec::new(),
    };

    // A missing descriptor is reported by the hook itself.
    if let Some(account) = accounts.extra_account_meta_list.account {
        if account.owner == program_id {
            let descriptor: ExtraAccountMetaList = account
                .decode(&descriptor_address)
                .map_err(|e| LedgerError::hook(program_id, HookError::from_load(e)))?;
            let resolved = descriptor
                .resolve(&accounts.keys(), &program_id)
                .map_err(|e| LedgerError::hook(program_id, e))?;

            accounts.extra = resolved
                .into_iter()
                .map(|meta| AccountRef {
                    address: meta.address,
                    is_signer: meta.is_signer,
                    is_writable: meta.is_writable,
                    account: tx.account(&meta.address),
                })
                .collect();
        }
    }

    hook.execute(&accounts, amount)
        .map_err(|e| LedgerError::hook(program_id, e))
}

fn load_mint<V: AccountView>(view: &V, mint: &Address) -> LedgerResult<Mint> {
    view.load(mint, &token_program_id()).map_err(|e| match e {
        StoreError::NotFound(address) => LedgerError::AccountNotFound(address),
        StoreError::OwnerMismatch { address, .. } | StoreError::KindMismatch { address, .. } => {
            LedgerError::InvalidAccount {
                address,
                reason: "not a mint",
            }
        }
        other => other.into(),
    })
}

fn load_token_account<V: AccountView>(view: &V, address: &Address) -> LedgerResult<TokenAccount> {
    view.load(address, &token_program_id()).map_err(|e| match e {
        StoreError::NotFound(address) => LedgerError::AccountNotFound(address),
        StoreError::OwnerMismatch { address, .. } | StoreError::KindMismatch { address, .. } => {
            LedgerError::InvalidAccount {
                address,
                reason: "not a token account",
            }
        }
        other => other.into(),
    })
}

fn check_mint(address: &Address, account: &TokenAccount, mint: &Address) -> LedgerResult<()> {
    if account.mint != *mint {
        return Err(LedgerError::MintMismatch {
            account: *address,
            expected: *mint,
            actual: account.mint,
        });
    }
    Ok(())
}
