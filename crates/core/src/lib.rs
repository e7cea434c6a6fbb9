//! HookGate Core - Shared domain types
//!
//! This crate contains the types used across HookGate:
//! - `Address`: 32-byte identity and deterministic address derivation
//! - `AccountStore`: keyed, versioned records with staged transactions
//! - `Mint` / `TokenAccount`: token state
//! - `TokenAmount`: base-unit quantities with UI conversion
//! - `Keypair` / `VerifiedSigner`: Ed25519 signing and the signer capability

pub mod address;
pub mod amount;
pub mod signer;
pub mod store;
pub mod token;

pub use address::{derive_address, Address, AddressError, ADDRESS_LEN};
pub use amount::{AmountError, TokenAmount};
pub use signer::{Keypair, Signature, SignatureError, Signer, VerifiedSigner};
pub use store::{AccountStore, AccountView, Record, StoreError, StoreTransaction, StoredAccount};
pub use token::{token_program_id, Mint, TokenAccount};
