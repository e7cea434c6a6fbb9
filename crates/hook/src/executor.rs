//! Hook executor - validates one transfer
//!
//! ```text
//! ExecuteAccounts
//!        │
//!        ▼
//! ┌──────────────────────┐
//! │ Account checks       │──► InvalidAccount
//! └──────────┬───────────┘
//!            ▼
//! ┌──────────────────────┐
//! │ Source transferring? │──► NotTransferring
//! └──────────┬───────────┘
//!            ▼
//! ┌──────────────────────┐
//! │ Descriptor + extras  │──► NotInitialized / InvalidAccount
//! └──────────┬───────────┘
//!            ▼
//! ┌──────────────────────┐
//! │ Allow-list lookup    │──► WhitelistRejected
//! └──────────┬───────────┘
//!            ▼
//!           Ok
//! ```
//!
//! Runs for every transfer, including zero amounts and self-transfers.
//! Reads only; nothing is cached between calls.

use hookgate_core::{token_program_id, Address, Mint, TokenAccount, TokenAmount};

use crate::allowlist::AllowList;
use crate::context::{AccountRef, ExecuteAccounts};
use crate::descriptor::ExtraAccountMetaList;
use crate::error::{HookError, HookResult};
use crate::seeds;

/// Validate a transfer for the whitelist hook owned by `program_id`
pub fn execute(
    program_id: &Address,
    accounts: &ExecuteAccounts<'_>,
    amount: TokenAmount,
) -> HookResult<()> {
    let mint = accounts.mint.address;

    let source = token_account(&accounts.source, &mint, "source is not a token account")?;
    token_account(
        &accounts.destination,
        &mint,
        "destination is not a token account",
    )?;
    accounts
        .mint
        .load::<Mint>(&token_program_id())
        .map_err(|_| HookError::invalid_account(mint, "not a token mint"))?;

    if source.owner != accounts.owner.address {
        return Err(HookError::invalid_account(
            accounts.owner.address,
            "owner does not own the source account",
        ));
    }

    let descriptor_address = seeds::extra_account_meta_list_address(&mint, program_id)?;
    if accounts.extra_account_meta_list.address != descriptor_address {
        return Err(HookError::invalid_account(
            accounts.extra_account_meta_list.address,
            "not the capability descriptor of this mint",
        ));
    }

    if !source.transferring {
        return Err(HookError::NotTransferring(accounts.source.address));
    }

    let descriptor: ExtraAccountMetaList = accounts.extra_account_meta_list.load(program_id)?;
    descriptor.check_layout(&descriptor_address)?;

    let resolved = descriptor.resolve(&accounts.keys(), program_id)?;
    if resolved.len() != accounts.extra.len() {
        return Err(HookError::invalid_account(
            descriptor_address,
            "extra accounts do not match the descriptor",
        ));
    }
    for (meta, supplied) in resolved.iter().zip(&accounts.extra) {
        if meta.address != supplied.address {
            return Err(HookError::invalid_account(
                supplied.address,
                "extra account does not match the descriptor",
            ));
        }
    }

    let list_ref = accounts
        .extra
        .first()
        .ok_or_else(|| HookError::invalid_account(descriptor_address, "no allow-list declared"))?;
    let list: AllowList = list_ref.load(program_id)?;
    let list = list.validated(&list_ref.address)?;

    let destination = accounts.destination.address;
    if !list.contains(&destination) {
        tracing::warn!(
            mint = %mint,
            destination = %destination,
            amount = %amount,
            "Transfer rejected: destination not in allow-list"
        );
        return Err(HookError::WhitelistRejected(destination));
    }

    tracing::debug!(
        mint = %mint,
        destination = %destination,
        amount = %amount,
        "Transfer approved"
    );
    Ok(())
}

fn token_account(
    account: &AccountRef<'_>,
    mint: &Address,
    not_token_account: &'static str,
) -> HookResult<TokenAccount> {
    let state: TokenAccount = account
        .load(&token_program_id())
        .map_err(|_| HookError::invalid_account(account.address, not_token_account))?;

    if state.mint != *mint {
        return Err(HookError::invalid_account(
            account.address,
            "token account belongs to another mint",
        ));
    }

    Ok(state)
}
