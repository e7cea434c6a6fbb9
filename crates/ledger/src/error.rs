//! Ledger errors

use hookgate_core::{Address, AddressError, AmountError, SignatureError, StoreError, TokenAmount};
use hookgate_hook::HookError;
use thiserror::Error;

/// Errors that can occur in ledger operations
///
/// Any error discards every write staged by the failing operation.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Account not found: {0}")]
    AccountNotFound(Address),

    #[error("Invalid account {address}: {reason}")]
    InvalidAccount {
        address: Address,
        reason: &'static str,
    },

    #[error("Account {account} holds mint {actual}, expected {expected}")]
    MintMismatch {
        account: Address,
        expected: Address,
        actual: Address,
    },

    #[error("Mint {mint} has {expected} decimals, got {actual}")]
    DecimalsMismatch { mint: Address, expected: u8, actual: u8 },

    #[error("Insufficient funds in {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        account: Address,
        balance: TokenAmount,
        requested: TokenAmount,
    },

    #[error("Signer {signer} does not own {account} (owner {owner})")]
    OwnerMismatch {
        account: Address,
        signer: Address,
        owner: Address,
    },

    #[error("Signer {signer} is not the mint authority of {mint}")]
    MintAuthorityMismatch { mint: Address, signer: Address },

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Transfer hook program not registered: {0}")]
    HookProgramNotFound(Address),

    #[error("Hook program {program_id} failed: {source}")]
    Hook {
        program_id: Address,
        source: HookError,
    },

    #[error("Signature error: {0}")]
    Signature(#[from] SignatureError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Amount error: {0}")]
    Amount(#[from] AmountError),

    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    /// Wrap a hook failure with the program that raised it
    pub fn hook(program_id: Address, source: HookError) -> Self {
        LedgerError::Hook { program_id, source }
    }

    /// The underlying hook error, if a hook failed
    pub fn hook_error(&self) -> Option<&HookError> {
        match self {
            LedgerError::Hook { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Check if a transfer hook denied the operation
    pub fn is_rejection(&self) -> bool {
        self.hook_error().is_some_and(HookError::is_rejection)
    }
}
