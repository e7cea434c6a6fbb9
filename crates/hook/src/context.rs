//! Execute context - the accounts the ledger hands to a hook
//!
//! Everything here borrows the ledger's staged state immutably, so a hook
//! can read but never write during Execute.

use hookgate_core::{Address, Record, StoredAccount};

use crate::error::{HookError, HookResult};

/// One account passed to Execute
#[derive(Debug, Clone, Copy)]
pub struct AccountRef<'a> {
    pub address: Address,
    pub is_signer: bool,
    pub is_writable: bool,
    /// `None` when nothing exists at `address`
    pub account: Option<&'a StoredAccount>,
}

impl<'a> AccountRef<'a> {
    /// A read-only, non-signer account
    pub fn readonly(address: Address, account: Option<&'a StoredAccount>) -> Self {
        Self {
            address,
            is_signer: false,
            is_writable: false,
            account,
        }
    }

    /// Decode the record, requiring it to exist and be owned by `owner`
    pub fn load<T: Record>(&self, owner: &Address) -> HookResult<T> {
        let account = self
            .account
            .ok_or(HookError::NotInitialized(self.address))?;

        if account.owner != *owner {
            return Err(HookError::invalid_account(
                self.address,
                "account has the wrong owner",
            ));
        }

        account.decode(&self.address).map_err(HookError::from_load)
    }
}

/// Accounts for Execute in key order
///
/// ```text
/// 0 source  1 mint  2 destination  3 owner  4 descriptor  5.. extras
/// ```
#[derive(Debug, Clone)]
pub struct ExecuteAccounts<'a> {
    pub source: AccountRef<'a>,
    pub mint: AccountRef<'a>,
    pub destination: AccountRef<'a>,
    pub owner: AccountRef<'a>,
    pub extra_account_meta_list: AccountRef<'a>,
    /// Accounts resolved from the descriptor, in descriptor order
    pub extra: Vec<AccountRef<'a>>,
}

impl ExecuteAccounts<'_> {
    /// Keys that descriptor seeds index into
    pub fn keys(&self) -> Vec<Address> {
        vec![
            self.source.address,
            self.mint.address,
            self.destination.address,
            self.owner.address,
            self.extra_account_meta_list.address,
        ]
    }
}
