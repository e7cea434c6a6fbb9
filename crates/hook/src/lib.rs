//! HookGate Hook - Transfer hook that gates transfers on an allow-list
//!
//! The ledger invokes the hook on every transfer of a mint that names it:
//!
//! ```text
//! transfer_checked
//!     │
//!     ▼
//! ┌─────────────────────────────┐
//! │ Ledger stages debit/credit  │
//! │ and sets `transferring`     │
//! └─────────────────────────────┘
//!     │  reads descriptor at derive(["extra-account-metas", mint], hook)
//!     ▼
//! ┌─────────────────────────────┐
//! │ EXECUTE                     │ ← destination must be allow-listed
//! │ (read-only)                 │
//! └─────────────────────────────┘
//!     │
//!     ▼
//! commit, or discard everything on error
//! ```
//!
//! Administration (Config, descriptor, allow-list edits) goes through
//! [`HookProgram::process_instruction`] with a verified signer.

pub mod allowlist;
pub mod config;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod executor;
pub mod instruction;
pub mod processor;
pub mod seeds;
pub mod settings;
pub mod traits;

pub use allowlist::{AllowList, PushOutcome};
pub use config::HookConfig;
pub use context::{AccountRef, ExecuteAccounts};
pub use descriptor::{ExtraAccountMeta, ExtraAccountMetaList, ResolvedMeta, Seed};
pub use error::{HookError, HookResult};
pub use instruction::{HookInstruction, InstructionKind};
pub use processor::WhitelistHook;
pub use seeds::{allowlist_address, config_address, extra_account_meta_list_address, id};
pub use settings::{DuplicatePolicy, HookSettings};
pub use traits::{HookProgram, NoOpHook};
