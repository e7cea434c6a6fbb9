//! HookGate Ledger - In-process token ledger with transfer hooks
//!
//! All token state changes go through this crate.
//!
//! # Key Types
//! - `TokenLedger`: mints, token accounts, checked transfers
//! - `HookRegistry`: transfer-hook programs by program id
//! - `LedgerOperation` / `SignedOperation`: signed state changes
//! - `LedgerError`: failures, with hook errors wrapped by program id

pub mod error;
pub mod ledger;
pub mod operation;
pub mod registry;

pub use error::{LedgerError, LedgerResult};
pub use hookgate_core::token_program_id;
pub use ledger::{associated_token_address, associated_token_program_id, mint_address, TokenLedger};
pub use operation::{LedgerOperation, OperationKind, SignedOperation};
pub use registry::HookRegistry;
