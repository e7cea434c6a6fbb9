//! Hook errors

use hookgate_core::{Address, AddressError, StoreError};
use thiserror::Error;

/// Errors from the transfer-hook program
///
/// Every variant aborts the enclosing operation. Nothing is retried here.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("Signer {signer} is not the administrator {authority}")]
    Unauthorized { signer: Address, authority: Address },

    #[error("Account already initialized: {0}")]
    AlreadyInitialized(Address),

    #[error("Account not initialized: {0}")]
    NotInitialized(Address),

    #[error("Address already in allow-list: {0}")]
    AlreadyPresent(Address),

    #[error("Address not found in allow-list: {0}")]
    NotFound(Address),

    #[error("Allow-list capacity exceeded (max {max} entries)")]
    CapacityExceeded { max: usize },

    #[error("Destination {0} is not in the allow-list")]
    WhitelistRejected(Address),

    #[error("Account {address} layout mismatch: expected {expected}, got {actual}")]
    AccountSizeMismatch {
        address: Address,
        expected: usize,
        actual: usize,
    },

    #[error("Source account {0} is not currently transferring")]
    NotTransferring(Address),

    #[error("Invalid account {address}: {reason}")]
    InvalidAccount {
        address: Address,
        reason: &'static str,
    },

    #[error("Invalid instruction: {0}")]
    InvalidInstruction(String),

    #[error("Invalid seeds: {0}")]
    InvalidSeeds(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for hook operations
pub type HookResult<T> = Result<T, HookError>;

impl HookError {
    /// Create an invalid-account error
    pub fn invalid_account(address: Address, reason: &'static str) -> Self {
        HookError::InvalidAccount { address, reason }
    }

    /// Map a failed record load into the hook taxonomy
    ///
    /// A missing record means the hook was never set up for this token;
    /// a record of the wrong type or owner is an invalid account.
    pub fn from_load(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(address) => HookError::NotInitialized(address),
            StoreError::OwnerMismatch { address, .. } => {
                HookError::invalid_account(address, "account has the wrong owner")
            }
            StoreError::KindMismatch { address, .. } => {
                HookError::invalid_account(address, "account holds an unexpected record")
            }
            other => HookError::Store(other),
        }
    }

    /// Check if this is a transfer denial
    pub fn is_rejection(&self) -> bool {
        matches!(self, HookError::WhitelistRejected(_))
    }

    /// Stable numeric code, reported alongside the message
    pub fn code(&self) -> u32 {
        match self {
            HookError::Unauthorized { .. } => 6000,
            HookError::AlreadyInitialized(_) => 6001,
            HookError::NotInitialized(_) => 6002,
            HookError::AlreadyPresent(_) => 6003,
            HookError::NotFound(_) => 6004,
            HookError::CapacityExceeded { .. } => 6005,
            HookError::WhitelistRejected(_) => 6006,
            HookError::AccountSizeMismatch { .. } => 6007,
            HookError::NotTransferring(_) => 6008,
            HookError::InvalidAccount { .. } => 6009,
            HookError::InvalidInstruction(_) => 6010,
            HookError::InvalidSeeds(_) => 6011,
            HookError::Config(_) => 6012,
            HookError::Store(_) => 6013,
        }
    }
}

impl From<AddressError> for HookError {
    fn from(err: AddressError) -> Self {
        HookError::InvalidSeeds(err.to_string())
    }
}
