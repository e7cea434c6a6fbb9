//! HookGate Events - JSONL journal of committed operations
//!
//! Every operation the ledger commits is appended here, chained by SHA-256.
//! The journal is the source of truth: replaying it through a fresh ledger
//! rebuilds all state. Rejected operations are never written.

pub mod error;
pub mod hash;
pub mod reader;
pub mod record;
pub mod store;

pub use error::{EventError, EventResult};
pub use hash::{calculate_record_hash, verify_chain, ChainError};
pub use reader::JournalReader;
pub use record::{JournalRecord, GENESIS_HASH};
pub use store::JournalStore;
